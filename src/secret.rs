use std::fmt;

/// A wrapper that prevents accidental exposure of sensitive values.
///
/// Passwords submitted with a command travel as `Secret<String>` so they
/// never show up in logs, notifications or audit events. The wrapped
/// value can only be read through [`expose_secret`](Self::expose_secret).
///
/// # Examples
///
/// ```
/// use usecase_core::Secret;
///
/// let password = Secret::new("correct horse".to_string());
///
/// assert_eq!(format!("{:?}", password), "[REDACTED]");
/// assert_eq!(format!("{}", password), "[REDACTED]");
/// assert_eq!(password.expose_secret(), "correct horse");
/// ```
// No Clone, Copy or Default: secrets are moved, never duplicated.
pub struct Secret<T> {
    inner: T,
}

impl<T> Secret<T> {
    /// Wraps a sensitive value in a `Secret`.
    pub fn new(value: T) -> Self {
        Self { inner: value }
    }

    /// Explicitly exposes the secret value.
    ///
    /// The name is verbose on purpose; do not log what it returns.
    pub fn expose_secret(&self) -> &T {
        &self.inner
    }
}

impl<T> fmt::Debug for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl<T> fmt::Display for Secret<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_redacts_debug() {
        let password = Secret::new("hunter22".to_string());
        let debug_output = format!("{:?}", password);

        assert_eq!(debug_output, "[REDACTED]");
        assert!(!debug_output.contains("hunter22"));
        assert!(!debug_output.contains("String"));
    }

    #[test]
    fn secret_redacts_inside_containers() {
        let fields = vec![("password", Secret::new("hunter22"))];
        let output = format!("{:?}", fields);

        assert!(!output.contains("hunter22"));
        assert!(output.contains("[REDACTED]"));
    }

    #[test]
    fn secret_exposes_when_explicit() {
        let secret = Secret::new(42);
        assert_eq!(*secret.expose_secret(), 42);
    }
}
