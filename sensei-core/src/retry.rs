//! Repetição síncrona com número limitado de tentativas, sem backoff.

use tracing::warn;

use crate::error::{NlpError, Result};

/// Tentativas padrão para carregar um modelo.
pub const DEFAULT_ATTEMPTS: usize = 3;

/// Executa `op` até ter sucesso ou esgotar `max_attempts`.
///
/// `op` recebe o número da tentativa (a partir de 1). Erros não transitórios
/// (ver [`NlpError::is_transient`]) interrompem na hora. Depois da última
/// tentativa o erro sobe embrulhado em [`NlpError::ModelLoad`].
pub fn with_attempts<T, F>(what: &str, max_attempts: usize, mut op: F) -> Result<T>
where
    F: FnMut(usize) -> Result<T>,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) if attempt >= max_attempts => {
                return Err(NlpError::ModelLoad {
                    model: what.to_string(),
                    attempts: attempt,
                    source: Box::new(err),
                });
            }
            Err(err) => {
                warn!(model = what, attempt, max_attempts, error = %err, "falha ao carregar, tentando de novo");
                attempt += 1;
            }
        }
    }
}
