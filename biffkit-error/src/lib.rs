pub mod ext;
pub mod macros;
pub mod stack;
pub mod status_code;
pub mod types;

// Publicly re-export all error types and functions from the submodules to
// simplify access from external code.
pub use ext::*;
pub use macros::*;
pub use stack::*;
pub use status_code::*;
pub use types::*;

/// Результат верхнего уровня (контейнер, CLI) с цепочкой контекстов.
pub type BiffkitResult<T> = Result<T, StackError>;

/// Результат низкоуровневых операций кодека (примитивы, записи, сущности).
pub type BiffResult<T> = Result<T, BiffError>;
