pub mod broadcast;
pub mod doctor;
pub mod report;
