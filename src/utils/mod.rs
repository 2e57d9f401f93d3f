pub mod bam_reader;
pub mod progress_manager;
