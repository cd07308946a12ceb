//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Log file location, shared by `setup_logging` and the help text
pub fn get_log_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("assignplan")
        .join("logs")
        .join("assignplan.log")
}

/// assignplan - break assignments into milestone checklists
#[derive(Parser)]
#[command(
    name = "ap",
    about = "Turn an assignment description and a deadline into an ordered milestone checklist",
    version = env!("CARGO_PKG_VERSION"),
    after_help = "Logs are written to: ~/.local/share/assignplan/logs/assignplan.log"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Database file, overriding the configured one
    #[arg(long, global = true, value_name = "PATH")]
    pub db: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Output format
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Subcommand)]
pub enum Command {
    /// Preview the milestones for a description without saving anything
    Split {
        /// Assignment description
        description: String,

        /// Due date (YYYY-MM-DD, YYYY/MM/DD, DD/MM/YYYY or MM/DD/YYYY)
        #[arg(short, long)]
        due: String,
    },

    /// Create an assignment and plan its milestones
    Create {
        #[arg(short, long)]
        title: String,

        /// Due date
        #[arg(short, long)]
        due: String,

        /// Free-text description; empty means no milestones are generated
        #[arg(short = 'D', long, default_value = "")]
        description: String,

        /// Explicit milestone (repeatable); skips generation entirely
        #[arg(short, long = "milestone", value_name = "TEXT")]
        milestones: Vec<String>,

        #[arg(short, long, default_value = "local")]
        owner: String,
    },

    /// List assignments
    List {
        #[arg(short, long)]
        owner: Option<String>,

        /// Show archived assignments instead of active ones
        #[arg(long, conflicts_with = "all")]
        archived: bool,

        /// Show active and archived assignments
        #[arg(long)]
        all: bool,
    },

    /// Show one assignment with its milestones
    Show { id: i64 },

    /// Change an assignment; any --milestone replaces the whole checklist
    Update {
        id: i64,

        #[arg(short, long)]
        title: Option<String>,

        #[arg(short = 'D', long)]
        description: Option<String>,

        #[arg(short, long)]
        due: Option<String>,

        #[arg(short, long = "milestone", value_name = "TEXT")]
        milestones: Vec<String>,
    },

    /// Mark a milestone done (or not done with --undo)
    Check {
        /// Milestone id
        id: i64,

        #[arg(long)]
        undo: bool,
    },

    /// Edit a milestone's text; completion changes only with --done/--undone
    Edit {
        /// Milestone id
        id: i64,

        /// New milestone text
        #[arg(short, long)]
        text: Option<String>,

        /// Also mark the milestone done
        #[arg(long, conflicts_with = "undone")]
        done: bool,

        /// Also mark the milestone not done
        #[arg(long)]
        undone: bool,
    },

    /// Reorder an assignment's milestones
    Reorder {
        /// Assignment id
        id: i64,

        /// Every milestone id of the assignment, in the new order
        #[arg(required = true, num_args = 1..)]
        order: Vec<i64>,
    },

    /// Renumber milestone orders to close gaps
    Repair {
        /// Assignment id
        id: i64,
    },

    /// Archive an assignment (or restore it with --undo)
    Archive {
        id: i64,

        #[arg(long)]
        undo: bool,
    },

    /// Delete an assignment and its milestones
    Delete { id: i64 },

    /// Show recent log lines
    Logs {
        /// Number of lines to show
        #[arg(short, long, default_value = "50")]
        lines: usize,
    },
}

/// Output format for every command
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_requires_command() {
        assert!(Cli::try_parse_from(["ap"]).is_err());
    }

    #[test]
    fn test_cli_parse_split() {
        let cli = Cli::parse_from(["ap", "split", "Write an essay", "--due", "2030-01-01"]);
        match cli.command {
            Command::Split { description, due } => {
                assert_eq!(description, "Write an essay");
                assert_eq!(due, "2030-01-01");
            }
            _ => panic!("Expected Split command"),
        }
    }

    #[test]
    fn test_cli_parse_create_with_milestones() {
        let cli = Cli::parse_from([
            "ap", "create", "-t", "Essay", "-d", "2030-01-01", "-m", "Outline", "-m", "Draft",
        ]);
        match cli.command {
            Command::Create {
                title,
                milestones,
                description,
                owner,
                ..
            } => {
                assert_eq!(title, "Essay");
                assert_eq!(milestones, vec!["Outline", "Draft"]);
                assert!(description.is_empty());
                assert_eq!(owner, "local");
            }
            _ => panic!("Expected Create command"),
        }
    }

    #[test]
    fn test_cli_parse_reorder() {
        let cli = Cli::parse_from(["ap", "reorder", "3", "9", "7", "8"]);
        match cli.command {
            Command::Reorder { id, order } => {
                assert_eq!(id, 3);
                assert_eq!(order, vec![9, 7, 8]);
            }
            _ => panic!("Expected Reorder command"),
        }
    }

    #[test]
    fn test_cli_edit_leaves_completion_alone() {
        let cli = Cli::parse_from(["ap", "edit", "4", "-t", "Outline, revised"]);
        match cli.command {
            Command::Edit { id, text, done, undone } => {
                assert_eq!(id, 4);
                assert_eq!(text.as_deref(), Some("Outline, revised"));
                assert!(!done);
                assert!(!undone);
            }
            _ => panic!("Expected Edit command"),
        }
    }

    #[test]
    fn test_cli_edit_done_flags_conflict() {
        assert!(Cli::try_parse_from(["ap", "edit", "4", "--done", "--undone"]).is_err());
    }

    #[test]
    fn test_cli_reorder_needs_ids() {
        assert!(Cli::try_parse_from(["ap", "reorder", "3"]).is_err());
    }

    #[test]
    fn test_cli_list_flags_conflict() {
        assert!(Cli::try_parse_from(["ap", "list", "--archived", "--all"]).is_err());
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("text".parse::<OutputFormat>(), Ok(OutputFormat::Text));
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert!("table".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_cli_global_options() {
        let cli = Cli::parse_from(["ap", "show", "1", "-c", "/path/to/config.yml", "--format", "json", "--db", "x.db"]);
        assert_eq!(cli.config, Some(PathBuf::from("/path/to/config.yml")));
        assert_eq!(cli.db, Some(PathBuf::from("x.db")));
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_log_path_location() {
        assert!(get_log_path().ends_with("assignplan/logs/assignplan.log"));
    }
}
