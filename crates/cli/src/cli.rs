use std::path::PathBuf;

use quay_store::Command;

#[derive(clap::Parser, Debug)]
#[command(name = "quay", version, about = "Manage extensions of the host application")]
pub struct Cli {
    /// List the installed extensions
    #[arg(long, conflicts_with_all = ["install_extension", "uninstall_extension"])]
    pub list_extensions: bool,

    /// Show versions of installed extensions, when using --list-extensions
    #[arg(long, requires = "list_extensions")]
    pub show_versions: bool,

    /// Install an extension by id or from a .vsix package path
    #[arg(long, value_name = "ID_OR_PATH", num_args = 1.., conflicts_with = "uninstall_extension")]
    pub install_extension: Vec<String>,

    /// Uninstall an extension by id
    #[arg(long, value_name = "ID", num_args = 1..)]
    pub uninstall_extension: Vec<String>,

    /// Set the root path for extensions
    #[arg(long, value_name = "DIR")]
    pub extensions_dir: Option<PathBuf>,

    /// Directory where user data is kept
    #[arg(long, value_name = "DIR")]
    pub user_data_dir: Option<PathBuf>,

    /// Use a specific configuration file
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// The lifecycle command selected by the flags, if any
    pub fn lifecycle_command(&self) -> Option<Command> {
        if self.list_extensions {
            Some(Command::List {
                show_versions: self.show_versions,
            })
        } else if !self.install_extension.is_empty() {
            Some(Command::Install(self.install_extension.clone()))
        } else if !self.uninstall_extension.is_empty() {
            Some(Command::Uninstall(self.uninstall_extension.clone()))
        } else {
            None
        }
    }
}
