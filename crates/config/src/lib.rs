use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StimulusInputs {
    /// Byte stimulus file fed to the pump, resolved relative to the script.
    pub stimulus: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(deny_unknown_fields)]
pub struct HarnessLimits {
    /// Optional cap on bytes delivered to the handler.
    #[serde(default)]
    pub max_bytes: Option<u64>,
}

/// Which handler the harness plugs into the pump. The real firmware
/// handler is out of scope; these are desktop stand-ins.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HandlerKind {
    Null,
    Echo,
}

impl Default for HandlerKind {
    fn default() -> Self {
        HandlerKind::Echo
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    EndOfStream,
    MaxBytes,
    ReadError,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct EchoContainsAssertion {
    pub echo_contains: String,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct StopReasonAssertion {
    pub expected_stop_reason: StopReason,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct ByteCountAssertion {
    pub expected_byte_count: u64,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(untagged)]
pub enum HarnessAssertion {
    EchoContains(EchoContainsAssertion),
    ExpectedStopReason(StopReasonAssertion),
    ExpectedByteCount(ByteCountAssertion),
}

#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(deny_unknown_fields)]
pub struct HarnessScript {
    pub schema_version: String,
    pub inputs: StimulusInputs,
    #[serde(default)]
    pub handler: HandlerKind,
    #[serde(default)]
    pub limits: HarnessLimits,
    #[serde(default)]
    pub assertions: Vec<HarnessAssertion>,
}

impl HarnessScript {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let f = std::fs::File::open(&path)
            .with_context(|| format!("Failed to open harness script at {:?}", path.as_ref()))?;
        let script: Self =
            serde_yaml::from_reader(f).context("Failed to parse Harness Script YAML")?;
        script.validate()?;
        Ok(script)
    }

    pub fn validate(&self) -> Result<()> {
        if self.schema_version != "1.0" {
            anyhow::bail!(
                "Unsupported schema_version '{}'. Supported versions: '1.0'",
                self.schema_version
            );
        }

        if self.inputs.stimulus.trim().is_empty() {
            anyhow::bail!("Input 'stimulus' path cannot be empty");
        }

        if self.limits.max_bytes == Some(0) {
            anyhow::bail!("Limit 'max_bytes' must be greater than zero when set");
        }

        Ok(())
    }
}
