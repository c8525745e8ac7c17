pub mod arrivals;
pub mod whoami;
