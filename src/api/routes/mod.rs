pub mod export;
pub mod history;
pub mod riders;
pub mod stages;
pub mod standings;
