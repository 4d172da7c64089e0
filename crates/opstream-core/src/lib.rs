/*!
 * Opstream Core
 * 
 * Tipos e erros compartilhados para a workspace Opstream
 */

pub mod types;
pub mod error;

// Re-exportações públicas
pub use error::{Error, Result};
pub use types::*;
