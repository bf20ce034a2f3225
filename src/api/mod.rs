pub mod department;
pub mod employee;
pub mod session;
pub mod timekeeping;
