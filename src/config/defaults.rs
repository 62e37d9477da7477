//! Default configuration values

/// Default application source folder
pub const DEFAULT_APP_FOLDER: &str = "app";

/// Default main script
pub const DEFAULT_MAIN_SCRIPT: &str = "app.py";

/// Default requirements file
pub const DEFAULT_REQUIREMENTS_FILE: &str = "requirements.txt";

/// Mirror suggested by the wizard
pub const DEFAULT_MIRROR: &str = "https://pypi.tuna.tsinghua.edu.cn/simple";

/// Packages installed before the project's own requirements
pub const BUILD_ESSENTIALS: &[&str] = &["setuptools", "wheel"];

/// File name of the runtime provisioning helper
pub const RUNTIME_SCRIPT_NAME: &str = "PythonEmbed4Win.ps1";

/// File name of the pip installer
pub const PIP_INSTALLER_NAME: &str = "get-pip.py";

/// Interpreter inside an embedded runtime
pub const RUNTIME_INTERPRETER: &str = "python.exe";

/// Windowless interpreter inside an embedded runtime
pub const RUNTIME_WINDOWLESS_INTERPRETER: &str = "pythonw.exe";

/// Directory under the project holding launcher sources
pub const LAUNCHER_BUILD_DIR: &str = "build";

/// Scratch directory `cythonize -i` creates in the application folder
pub const CYTHON_BUILD_DIR: &str = "build";

/// Command name used in reproducible commands
pub const COMMAND_NAME: &str = "pysuitcase";
