pub mod dsr;
