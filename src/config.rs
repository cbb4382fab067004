/// Limits and presentation settings for one shell session.
#[derive(Debug, Clone)]
pub struct ShellConfig {
    /// Number of job table slots. Slots are never reclaimed, so this is also
    /// the number of `run` commands a session can ever admit.
    pub max_jobs: usize,
    /// Maximum number of simultaneously running jobs.
    pub max_running: usize,
    /// Input lines are truncated to this many bytes.
    pub max_line_len: usize,
    /// Tokens beyond this count are dropped from a command line.
    pub max_tokens: usize,
    pub prompt: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_jobs: 20,
            max_running: 3,
            max_line_len: 79,
            max_tokens: 19,
            prompt: "cs205$ ".to_string(),
        }
    }
}

impl ShellConfig {
    pub fn new(max_jobs: usize, max_running: usize) -> Self {
        Self {
            max_jobs,
            max_running,
            ..Default::default()
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_limits() {
        let config = ShellConfig::default();
        assert_eq!(config.max_jobs, 20);
        assert_eq!(config.max_running, 3);
        assert_eq!(config.max_tokens, 19);
    }

    #[test]
    fn new_keeps_input_defaults() {
        let config = ShellConfig::new(5, 1).with_prompt("> ");
        assert_eq!(config.max_jobs, 5);
        assert_eq!(config.max_running, 1);
        assert_eq!(config.max_line_len, 79);
        assert_eq!(config.prompt, "> ");
    }
}
