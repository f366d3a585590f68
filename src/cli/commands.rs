use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "dk", about = concat!("docket v", env!("CARGO_PKG_VERSION"), " - todos grouped by project"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Use a different data directory
    #[arg(short = 'C', long = "data-dir", global = true)]
    pub data_dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a commented docket.toml into the data directory
    Init(InitArgs),
    /// Read or change docket.toml
    Config(ConfigCmd),
    /// Add a todo (to the Inbox unless --project is given)
    Add(AddArgs),
    /// List open projects and their todos
    List(ListArgs),
    /// Show one todo with its notes
    Show(IdArg),
    /// Replace a todo's text
    Edit(EditArgs),
    /// Toggle a todo's completion
    Done(IdArg),
    /// Delete a todo
    Rm(IdArg),
    /// Move a todo to the archive
    Archive(IdArg),
    /// Bring a todo back from the archive
    Unarchive(IdArg),
    /// Move a todo to another project
    Mv(MvArgs),
    /// Set a todo's notes
    Note(NoteArgs),
    /// Move a todo within its project
    Reorder(ReorderArgs),
    /// List tags in use
    Tags,
    /// Show archived projects and todos
    Archived,
    /// Project management
    Project(ProjectCmd),
    /// Collapse or expand a project in listings
    Collapse(IdArg),
    /// Expand every project
    ExpandAll,
    /// Collapse every project except the Inbox
    CollapseAll,
    /// Linked data file
    File(FileCmd),
}

// ---------------------------------------------------------------------------
// Setup
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Overwrite an existing docket.toml
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ConfigCmd {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print a setting (table.key), or every setting
    Get(ConfigGetArgs),
    /// Change a setting, keeping the file's comments
    Set(ConfigSetArgs),
    /// Print the path of docket.toml
    Path,
}

#[derive(Args)]
pub struct ConfigGetArgs {
    /// Setting name, e.g. file.reconnect_on_start
    pub key: Option<String>,
}

#[derive(Args)]
pub struct ConfigSetArgs {
    /// Setting name, e.g. projects.default_color
    pub key: String,
    /// New value
    pub value: String,
}

// ---------------------------------------------------------------------------
// Todos
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct IdArg {
    /// Record ID
    pub id: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Todo text; @words become tags
    pub text: String,
    /// Project ID or name
    #[arg(long, short)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct ListArgs {
    /// Only this project (ID or name)
    #[arg(long, short)]
    pub project: Option<String>,
    /// Show todos carrying any of these tags (repeatable)
    #[arg(long = "tag", short = 't')]
    pub tags: Vec<String>,
    /// Show todos of collapsed projects too
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct EditArgs {
    /// Todo ID
    pub id: String,
    /// New text
    pub text: String,
    /// Also move to this project (ID or name)
    #[arg(long, short)]
    pub project: Option<String>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Todo ID
    pub id: String,
    /// Target project (ID or name)
    pub project: String,
}

#[derive(Args)]
pub struct NoteArgs {
    /// Record ID
    pub id: String,
    /// Notes text (empty clears)
    pub text: String,
}

#[derive(Args)]
pub struct ReorderArgs {
    /// Record ID
    pub id: String,
    /// New position (0-indexed; for projects the Inbox holds 0)
    pub position: usize,
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct ProjectCmd {
    #[command(subcommand)]
    pub action: ProjectAction,
}

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a project
    Add(ProjectAddArgs),
    /// List projects in display order
    List(ProjectListArgs),
    /// Rename a project
    Rename(ProjectRenameArgs),
    /// Set a project's notes
    Note(NoteArgs),
    /// Archive a project and its todos
    Archive(IdArg),
    /// Unarchive a project and its todos
    Unarchive(IdArg),
    /// Delete a project; its todos move to the Inbox
    Rm(IdArg),
    /// Move a project to a position
    Reorder(ReorderArgs),
    /// Move a project up one place
    Up(IdArg),
    /// Move a project down one place
    Down(IdArg),
}

#[derive(Args)]
pub struct ProjectAddArgs {
    /// Project name
    pub name: String,
    /// Color, e.g. "#123456"
    #[arg(long)]
    pub color: Option<String>,
}

#[derive(Args)]
pub struct ProjectListArgs {
    /// Include archived projects
    #[arg(long)]
    pub all: bool,
}

#[derive(Args)]
pub struct ProjectRenameArgs {
    /// Project ID or name
    pub id: String,
    /// New name
    pub name: String,
}

// ---------------------------------------------------------------------------
// Linked file
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct FileCmd {
    #[command(subcommand)]
    pub action: FileAction,
}

#[derive(Subcommand)]
pub enum FileAction {
    /// Import an existing data file and keep it in sync
    Open(PathArg),
    /// Export to a new data file and keep it in sync
    Create(PathArg),
    /// Re-read the linked file
    Load,
    /// Write the linked file now
    Save,
    /// Stop syncing with the linked file
    Unbind,
    /// Show which file is linked
    Status,
}

#[derive(Args)]
pub struct PathArg {
    /// File path (for create, a directory gets the default file name)
    pub path: String,
}
