pub mod import_jobs;
