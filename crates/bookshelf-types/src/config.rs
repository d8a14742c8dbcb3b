use clap::Parser;
use std::path::PathBuf;

const DB_FILE_NAME: &str = "bookshelf.db";

#[derive(Debug, Clone, Parser)]
pub struct BackendConfig {
    #[arg(
        long,
        env = "BOOKSHELF_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/bookshelf.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "BOOKSHELF_DATA_DIR",
        help = "Data directory (database etc.), default is system default like ~/.local/share/bookshelf",
        default_value_t = default_data_dir()
    )]
    data_dir: String,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("bookshelf"))
        .unwrap_or_else(|| PathBuf::from("bookshelf"))
        .to_string_lossy()
        .to_string()
}

impl BackendConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url.clone().unwrap_or_else(|| {
            format!(
                "sqlite://{}",
                self.data_dir().join(DB_FILE_NAME).to_string_lossy()
            )
        })
    }
}
