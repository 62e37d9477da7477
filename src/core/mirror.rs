//! Package index mirror handling
//!
//! pip only accepts an alternate index over plain HTTP, or with a
//! certificate it cannot verify, when the index host is also passed as a
//! trusted host.

use reqwest::Url;

/// Extract the host name of a mirror URL
pub fn mirror_host(mirror: &str) -> Result<String, String> {
    let url = Url::parse(mirror).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(format!("unsupported scheme '{other}'")),
    }
    url.host_str()
        .map(str::to_string)
        .ok_or_else(|| "URL has no host".to_string())
}

/// pip arguments selecting `mirror` as the index
///
/// Empty when no mirror is configured. A mirror whose host cannot be
/// extracted still gets `-i`; the resolver rejects such mirrors up front.
pub fn index_args(mirror: Option<&str>) -> Vec<String> {
    let Some(mirror) = mirror else {
        return Vec::new();
    };

    let mut args = vec!["-i".to_string(), mirror.to_string()];
    if let Ok(host) = mirror_host(mirror) {
        args.push("--trusted-host".to_string());
        args.push(host);
    }
    args
}
