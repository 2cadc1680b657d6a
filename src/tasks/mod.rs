pub mod publish;
pub mod tick;
