//! PostgreSQL Repository Implementations

mod call_repository;
mod transcript_repository;

pub use call_repository::PgCallRepository;
pub use transcript_repository::PgTranscriptRepository;
