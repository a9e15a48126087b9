use thiserror::Error;

/// Errors reported by the statement bridge
///
/// Every variant names the SQL that triggered it so a single message is
/// enough for the caller to act on. Nothing is retried internally.
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Can't prepare statement: '{sql}' - Error: {message}")]
    Prepare { sql: String, message: String },

    #[error("Can't execute statement: '{sql}' - Error: {message}")]
    Execution { sql: String, message: String },

    #[error("Statement has not been executed: '{sql}'")]
    NotExecuted { sql: String },

    #[error("Invalid parameters: {0}")]
    Bind(String),
}

impl BridgeError {
    pub fn prepare(sql: &str, err: anyhow::Error) -> Self {
        BridgeError::Prepare {
            sql: sql.to_string(),
            message: format!("{:#}", err),
        }
    }

    pub fn execution(sql: &str, err: anyhow::Error) -> Self {
        BridgeError::Execution {
            sql: sql.to_string(),
            message: format!("{:#}", err),
        }
    }
}

pub type Result<T> = std::result::Result<T, BridgeError>;

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Context};

    #[test]
    fn test_prepare_message_combines_sql_and_diagnostic() {
        let err = BridgeError::prepare("SELEC 1", anyhow!("syntax error at 'SELEC'"));
        assert_eq!(
            err.to_string(),
            "Can't prepare statement: 'SELEC 1' - Error: syntax error at 'SELEC'"
        );
    }

    #[test]
    fn test_execution_message_keeps_context_chain() {
        let source: anyhow::Result<()> = Err(anyhow!("division by zero"));
        let err = BridgeError::execution("SELECT 1 / 0", source.context("fetch failed").unwrap_err());

        let message = err.to_string();
        assert!(message.contains("SELECT 1 / 0"));
        assert!(message.contains("fetch failed: division by zero"));
    }
}
