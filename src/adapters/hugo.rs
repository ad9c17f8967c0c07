use crate::utils::error::{AcademicError, Result};
use tokio::process::Command;

/// Runs `binary` with `args`, inheriting stdio, and returns its exit code.
pub async fn run_hugo(binary: &str, args: &[String]) -> Result<i32> {
    tracing::debug!("Forwarding to {} {:?}", binary, args);

    let status = Command::new(binary)
        .args(args)
        .status()
        .await
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => AcademicError::HugoNotFound {
                binary: binary.to_string(),
            },
            _ => AcademicError::IoError(e),
        })?;

    // A signal-terminated child has no code.
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_binary() {
        let result = run_hugo("definitely-not-a-hugo-binary-1234", &[]).await;
        assert!(matches!(result, Err(AcademicError::HugoNotFound { .. })));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_code_is_forwarded() {
        let code = run_hugo("sh", &["-c".to_string(), "exit 3".to_string()])
            .await
            .unwrap();
        assert_eq!(code, 3);
    }
}
