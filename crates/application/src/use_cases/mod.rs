pub mod doh;

pub use doh::HandleDohQueryUseCase;
