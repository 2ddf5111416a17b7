/// Where the suite publishes its outputs for the CI host.
pub trait ReportSink {
    /// Exposes a named output value.
    fn set_output(&mut self, name: &str, value: &str) -> anyhow::Result<()>;

    /// Raises a failure signal; called once per non-passing test.
    fn fail(&mut self, message: &str) -> anyhow::Result<()>;

    /// Sends a short free-text summary.
    fn notify(&mut self, text: &str) -> anyhow::Result<()>;
}

/// Keeps everything in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    pub outputs: Vec<(String, String)>,
    pub failures: Vec<String>,
    pub notes: Vec<String>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last value set for `name`.
    pub fn output(&self, name: &str) -> Option<&str> {
        self.outputs
            .iter()
            .rev()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

impl ReportSink for MemorySink {
    fn set_output(&mut self, name: &str, value: &str) -> anyhow::Result<()> {
        self.outputs.push((name.to_owned(), value.to_owned()));
        Ok(())
    }

    fn fail(&mut self, message: &str) -> anyhow::Result<()> {
        self.failures.push(message.to_owned());
        Ok(())
    }

    fn notify(&mut self, text: &str) -> anyhow::Result<()> {
        self.notes.push(text.to_owned());
        Ok(())
    }
}
