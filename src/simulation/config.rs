use log::info;

/// Every way a simulation configuration can be out of range
#[derive(thiserror::Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("dimensions must be at least 1 (height = {height}, width = {width})")]
    Dimensions { height: usize, width: usize },
    #[error("{name} must be between 0 and 1 (found {value})")]
    Rate { name: &'static str, value: f64 },
    #[error("ploidy must be at least 2 (found {ploidy})")]
    Ploidy { ploidy: usize },
    #[error("fragment length must be at least 1 and at most {max} (found {length})")]
    FragmentLength { length: usize, max: usize },
    #[error("insert length must be at most {max} (found {length})")]
    InsertLength { length: usize, max: usize },
    #[error("coverage and fragment length parameters must be positive")]
    NonPositiveParameter,
    #[error("minimum fragment length ({min}) must be less than or equal to maximum fragment length ({max})")]
    LengthBounds { min: usize, max: usize },
    #[error("at least two SNP sites are required (found {num_snps})")]
    TooFewSnps { num_snps: usize },
    #[error("read length must be positive for paired-end reads")]
    ReadLength,
    #[error("invalid fragment length distribution: {message}")]
    LengthModel { message: String }
}

/// Checks that a rate is within [0, 1]
pub(crate) fn check_rate(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::Rate { name, value })
    }
}

/// Paired-end layout: two segments of the fragment length with an insert of gaps between them
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct PairedEnd {
    /// number of gap sites between the two segments
    pub insert_length: usize
}

/// Everything needed to simulate a fragment matrix
#[derive(Clone, Debug, PartialEq)]
pub struct SimulationConfig {
    /// number of fragments
    pub height: usize,
    /// number of sites
    pub width: usize,
    /// probability that an emitted call becomes a gap
    pub gap_rate: f64,
    /// probability that a non-gap call is flipped
    pub error_rate: f64,
    /// length of each fragment (or each segment when paired); defaults to the full usable width
    pub fragment_length: Option<usize>,
    /// number of haplotypes, k
    pub ploidy: usize,
    /// if set, fragments are read pairs
    pub paired_end: Option<PairedEnd>
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            height: 2,
            width: 1,
            gap_rate: 0.0,
            error_rate: 0.0,
            fragment_length: None,
            ploidy: 2,
            paired_end: None
        }
    }
}

impl SimulationConfig {
    /// Returns the number of gap sites between segments, 0 for single segments
    pub fn insert_length(&self) -> usize {
        self.paired_end.map(|p| p.insert_length).unwrap_or(0)
    }

    /// The largest segment length that still fits into the width
    fn max_segment_length(&self) -> usize {
        match self.paired_end {
            Some(p) => self.width.saturating_sub(p.insert_length) / 2,
            None => self.width
        }
    }

    /// Returns the length of a single segment
    pub fn segment_length(&self) -> usize {
        self.fragment_length.unwrap_or_else(|| self.max_segment_length())
    }

    /// Returns the number of sites a full fragment spans, including any insert
    pub fn span_length(&self) -> usize {
        match self.paired_end {
            Some(p) => 2 * self.segment_length() + p.insert_length,
            None => self.segment_length()
        }
    }

    /// Returns the number of legal start offsets for a fragment
    pub fn valid_starts(&self) -> usize {
        self.width - self.span_length() + 1
    }

    /// Checks every parameter against its allowed range.
    /// # Errors
    /// * if height or width is 0
    /// * if either rate is outside [0, 1]
    /// * if ploidy is less than 2
    /// * if the insert does not fit, or the fragment length is outside [1, width] (or [1, (width-insert)/2] for pairs)
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.height < 1 || self.width < 1 {
            return Err(ConfigError::Dimensions { height: self.height, width: self.width });
        }
        check_rate("gap rate", self.gap_rate)?;
        check_rate("error rate", self.error_rate)?;
        if self.ploidy < 2 {
            return Err(ConfigError::Ploidy { ploidy: self.ploidy });
        }

        if let Some(paired) = self.paired_end {
            // each segment needs at least one site
            let max_insert: usize = self.width.saturating_sub(2 * self.fragment_length.unwrap_or(1));
            if paired.insert_length > max_insert {
                return Err(ConfigError::InsertLength { length: paired.insert_length, max: max_insert });
            }
        }

        let length: usize = self.segment_length();
        let max_length: usize = self.max_segment_length();
        if length < 1 || length > max_length {
            return Err(ConfigError::FragmentLength { length, max: max_length });
        }
        Ok(())
    }

    /// Dumps the configuration to the logger
    pub fn log_settings(&self) {
        info!("Fragment matrix simulation:");
        info!("\tHeight (fragments): {}", self.height);
        info!("\tWidth (sites): {}", self.width);
        info!("\tPloidy: {}", self.ploidy);
        info!("\tGap rate: {}", self.gap_rate);
        info!("\tError rate: {}", self.error_rate);
        match self.paired_end {
            Some(p) => {
                info!("\tPaired-end: ENABLED");
                info!("\tSegment length: {}", self.segment_length());
                info!("\tInsert length: {}", p.insert_length);
            },
            None => {
                info!("\tPaired-end: DISABLED");
                info!("\tFragment length: {}", self.segment_length());
            }
        };
    }
}
