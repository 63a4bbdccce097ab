//! Configuration parameters for separation and pitch shifting

use crate::error::RepetError;

/// Separation configuration parameters
#[derive(Debug, Clone)]
pub struct SeparationConfig {
    /// FFT window size (default: 2048)
    pub n_fft: usize,

    /// Number of samples between successive frames (default: 512)
    pub hop_length: usize,

    /// Shortest repeating period to consider, in seconds (default: 1.0)
    pub min_period_secs: f32,

    /// Longest repeating period to consider, in seconds (default: 10.0)
    pub max_period_secs: f32,

    /// Beat-spectrum peak threshold, relative to the zero-lag value (default: 0.1)
    /// A candidate period must exceed this fraction of the zero-lag
    /// autocorrelation to count as a detection.
    pub period_peak_threshold: f32,

    /// Period used when no beat-spectrum peak clears the threshold,
    /// in seconds (default: 2.0)
    pub fallback_period_secs: f32,
}

impl Default for SeparationConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            hop_length: 512,
            min_period_secs: 1.0,
            max_period_secs: 10.0,
            period_peak_threshold: 0.1,
            fallback_period_secs: 2.0,
        }
    }
}

impl SeparationConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `RepetError::InvalidParameter` if the FFT size or hop length is
    /// zero, the hop length exceeds the FFT size, or the period search band is
    /// empty.
    pub fn validate(&self) -> Result<(), RepetError> {
        if self.n_fft == 0 {
            return Err(RepetError::InvalidParameter(
                "n_fft must be > 0".to_string(),
            ));
        }

        if self.hop_length == 0 {
            return Err(RepetError::InvalidParameter(
                "hop_length must be > 0".to_string(),
            ));
        }

        if self.hop_length > self.n_fft {
            return Err(RepetError::InvalidParameter(format!(
                "hop_length ({}) must not exceed n_fft ({})",
                self.hop_length, self.n_fft
            )));
        }

        if self.min_period_secs <= 0.0 || self.max_period_secs <= self.min_period_secs {
            return Err(RepetError::InvalidParameter(format!(
                "invalid period search band: [{:.2}, {:.2}] s",
                self.min_period_secs, self.max_period_secs
            )));
        }

        if self.fallback_period_secs <= 0.0 {
            return Err(RepetError::InvalidParameter(
                "fallback_period_secs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

/// Pitch detection and shifting configuration parameters
#[derive(Debug, Clone)]
pub struct PitchShiftConfig {
    /// FFT window size for the phase vocoder (default: 2048)
    /// The analysis hop is fixed at `n_fft / 4`.
    pub n_fft: usize,

    /// Lowest fundamental frequency the detector considers, in Hz (default: 60.0)
    pub min_frequency_hz: f32,

    /// Highest fundamental frequency the detector considers, in Hz (default: 1000.0)
    pub max_frequency_hz: f32,

    /// Autocorrelation peak threshold, relative to the zero-lag value (default: 0.5)
    pub pitch_peak_threshold: f32,
}

impl Default for PitchShiftConfig {
    fn default() -> Self {
        Self {
            n_fft: 2048,
            min_frequency_hz: 60.0,
            max_frequency_hz: 1000.0,
            pitch_peak_threshold: 0.5,
        }
    }
}

impl PitchShiftConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns `RepetError::InvalidParameter` if the FFT size is too small for
    /// phase-vocoder analysis or the frequency band is empty.
    pub fn validate(&self) -> Result<(), RepetError> {
        if self.n_fft < 4 {
            return Err(RepetError::InvalidParameter(format!(
                "n_fft ({}) too small for phase vocoder analysis",
                self.n_fft
            )));
        }

        if self.min_frequency_hz <= 0.0 || self.max_frequency_hz <= self.min_frequency_hz {
            return Err(RepetError::InvalidParameter(format!(
                "invalid frequency band: [{:.1}, {:.1}] Hz",
                self.min_frequency_hz, self.max_frequency_hz
            )));
        }

        Ok(())
    }
}
