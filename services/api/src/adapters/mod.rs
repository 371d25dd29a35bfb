pub mod blob;
pub mod db;
pub mod nougat;
pub mod summary_llm;

pub use blob::VercelBlobAdapter;
pub use db::PgStore;
pub use nougat::NougatAdapter;
pub use summary_llm::OpenRouterSummaryAdapter;
