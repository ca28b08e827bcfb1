use crate::config::AnalyzerConfig;
use crate::error::PlayerResult;
use crate::media::{FrequencyTap, MediaBinding};

// Baseline magnitude shown before anything has played
const BASELINE: u8 = 128;

/// Fixed-length per-bin magnitudes, updated in place
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnalyzerSnapshot {
    bins: Vec<u8>,
}

impl AnalyzerSnapshot {
    pub fn flat(len: usize) -> Self {
        Self {
            bins: vec![BASELINE; len],
        }
    }

    pub fn bins(&self) -> &[u8] {
        &self.bins
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Normalized magnitude (0.0-1.0) of bin `i`
    pub fn level(&self, i: usize) -> f32 {
        self.bins.get(i).map_or(0.0, |&v| f32::from(v) / 255.0)
    }
}

/// Lazily attached frequency analyser.
///
/// Attaches at most once per binding; refreshes only when told to by the analyser loop, so
/// a paused player keeps showing the last snapshot.
pub struct FrequencyAnalyzer {
    config: AnalyzerConfig,
    tap: Option<Box<dyn FrequencyTap>>,
    snapshot: AnalyzerSnapshot,
}

impl FrequencyAnalyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self {
            snapshot: AnalyzerSnapshot::flat(config.bin_count()),
            config,
            tap: None,
        }
    }

    pub fn is_attached(&self) -> bool {
        self.tap.is_some()
    }

    /// Attach to `binding` unless already attached.
    ///
    /// Returns `Ok(true)` when this call performed the attachment. A failure leaves the
    /// analyser detached so a later user gesture can try again.
    ///
    /// # Errors
    ///
    /// Whatever the binding reports, normally
    /// [`PlayerError::Initialization`](crate::error::PlayerError::Initialization).
    pub fn attach_once<B: MediaBinding>(&mut self, binding: &mut B) -> PlayerResult<bool> {
        if self.tap.is_some() {
            return Ok(false);
        }
        let tap = binding.attach_analyzer(&self.config)?;
        log::debug!("analyser attached with {} bins", tap.bin_count());
        self.tap = Some(tap);
        Ok(true)
    }

    /// Overwrite the snapshot with the tap's current data. No-op until attached.
    pub fn refresh(&mut self) {
        if let Some(tap) = &self.tap {
            tap.read_into(&mut self.snapshot.bins);
        }
    }

    pub fn snapshot(&self) -> &AnalyzerSnapshot {
        &self.snapshot
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{AttachFailure, FakeBinding};

    #[test]
    fn starts_flat_and_detached() {
        let mut a = FrequencyAnalyzer::new(AnalyzerConfig::default());
        assert!(!a.is_attached());
        a.refresh();
        assert_eq!(a.snapshot().len(), 128);
        assert!(a.snapshot().bins().iter().all(|&v| v == 128));
        assert!((a.snapshot().level(0) - 128.0 / 255.0).abs() < 1e-6);
        assert_eq!(a.snapshot().level(500), 0.0);
    }

    #[test]
    fn attaches_only_once() {
        let mut binding = FakeBinding::default();
        let mut a = FrequencyAnalyzer::new(AnalyzerConfig::default());
        assert_eq!(a.attach_once(&mut binding), Ok(true));
        assert_eq!(a.attach_once(&mut binding), Ok(false));
        assert_eq!(binding.analyser_attachments(), 1);
    }

    #[test]
    fn failed_attach_can_retry() {
        let mut binding = FakeBinding::default();
        binding.fail_next_attach();
        let mut a = FrequencyAnalyzer::new(AnalyzerConfig::default());
        assert!(a.attach_once(&mut binding).is_err());
        assert!(!a.is_attached());
        assert_eq!(a.attach_once(&mut binding), Ok(true));
    }

    #[test]
    fn retry_after_wiring_failure_reuses_routed_element() {
        let mut binding = FakeBinding::default();
        binding.fail_next_attach_at(AttachFailure::AfterRouting);
        let mut a = FrequencyAnalyzer::new(AnalyzerConfig::default());
        assert!(a.attach_once(&mut binding).is_err());
        assert!(!a.is_attached());
        assert_eq!(a.attach_once(&mut binding), Ok(true));
        assert_eq!(binding.routings(), 1);
    }

    #[test]
    fn refresh_copies_tap_data() {
        let mut binding = FakeBinding::default();
        let mut a = FrequencyAnalyzer::new(AnalyzerConfig::default());
        a.attach_once(&mut binding).unwrap();
        binding.set_spectrum(200);
        a.refresh();
        assert!(a.snapshot().bins().iter().all(|&v| v == 200));
        // frozen until the next refresh
        binding.set_spectrum(10);
        assert!(a.snapshot().bins().iter().all(|&v| v == 200));
    }
}
