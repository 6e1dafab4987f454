use image::DynamicImage;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use anyhow::Result;
use tracing::debug;

/// Location of a crop in the original frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoundingBox {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Data that flows through the pipeline
/// Each PipelineData is one image (a frame, a subtitle band or a box crop) with metadata
#[derive(Clone)]
pub struct PipelineData {
    /// The image data for this item
    pub image: DynamicImage,

    /// The frame this item was cut from (shared via Arc)
    pub original: Arc<DynamicImage>,

    /// Where `image` sits in the original frame (None means full frame)
    pub bbox: Option<BoundingBox>,

    /// Metadata such as "region_top", "index", "ocr_text"
    pub metadata: HashMap<String, MetadataValue>,
}

/// Metadata value types
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Float(f32),
    String(String),
    Int(i64),
}

impl PipelineData {
    /// Create PipelineData for a full frame
    pub fn from_image(image: DynamicImage) -> Self {
        let original = Arc::new(image.clone());
        Self {
            image,
            original,
            bbox: None,
            metadata: HashMap::new(),
        }
    }

    /// Create PipelineData for a region of a frame
    pub fn from_region(
        image: DynamicImage,
        original: Arc<DynamicImage>,
        bbox: BoundingBox,
    ) -> Self {
        Self {
            image,
            original,
            bbox: Some(bbox),
            metadata: HashMap::new(),
        }
    }

    /// Add metadata
    pub fn with_metadata(mut self, key: impl Into<String>, value: MetadataValue) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        match self.metadata.get(key) {
            Some(MetadataValue::Bool(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_float(&self, key: &str) -> Option<f32> {
        match self.metadata.get(key) {
            Some(MetadataValue::Float(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_int(&self, key: &str) -> Option<i64> {
        match self.metadata.get(key) {
            Some(MetadataValue::Int(v)) => Some(*v),
            _ => None,
        }
    }

    pub fn get_string(&self, key: &str) -> Option<&str> {
        match self.metadata.get(key) {
            Some(MetadataValue::String(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs
    pub output_dir: PathBuf,
}

/// Context available to all pipeline steps
#[derive(Clone, Default)]
pub struct PipelineContext {
    pub verbose: bool,
    pub debug: Option<DebugConfig>,
}

/// Trait that all pipeline steps must implement
pub trait PipelineStep: Send + Sync {
    /// Process data and return transformed data
    /// Steps can split data (1 → many), filter (many → fewer), or transform (many → many)
    fn process(&self, data: Vec<PipelineData>, context: &PipelineContext) -> Result<Vec<PipelineData>>;

    /// Human-readable name for this step (used in verbose output)
    fn name(&self) -> &str;
}

/// Composable pipeline builder
pub struct Pipeline {
    steps: Vec<Arc<dyn PipelineStep>>,
    context: PipelineContext,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self {
            steps: Vec::new(),
            context: PipelineContext::default(),
        }
    }

    /// Enable verbose output
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.context.verbose = verbose;
        self
    }

    /// Enable debug mode with output directory
    /// The directory must be empty or non-existent
    pub fn with_debug(mut self, output_dir: PathBuf) -> Result<Self> {
        if output_dir.exists() {
            let entries = std::fs::read_dir(&output_dir)?;
            if entries.count() > 0 {
                return Err(anyhow::anyhow!(
                    "Debug directory is not empty: {}",
                    output_dir.display()
                ));
            }
        } else {
            std::fs::create_dir_all(&output_dir)?;
        }

        self.context.debug = Some(DebugConfig { output_dir });
        Ok(self)
    }

    /// Add a processing step to the pipeline
    pub fn add_step(mut self, step: Arc<dyn PipelineStep>) -> Self {
        self.steps.push(step);
        self
    }

    /// Helper method to add a step from a Box (for convenience)
    pub fn add_step_boxed(mut self, step: Box<dyn PipelineStep>) -> Self {
        self.steps.push(Arc::from(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Run every step on the input items
    pub fn run(&self, input: Vec<PipelineData>) -> Result<Vec<PipelineData>> {
        self.run_partial(input, self.steps.len())
    }

    /// Run the pipeline but stop after `num_steps` steps (useful for debugging)
    pub fn run_partial(&self, input: Vec<PipelineData>, num_steps: usize) -> Result<Vec<PipelineData>> {
        if let Some(debug_config) = &self.context.debug {
            let input_dir = debug_config.output_dir.join("00_input");
            std::fs::create_dir_all(&input_dir)?;
            for (idx, item) in input.iter().enumerate() {
                item.image.save(input_dir.join(format!("{:02}.png", idx + 1)))
                    .map_err(|e| anyhow::anyhow!("Failed to save debug input: {}", e))?;
            }
            debug!(items = input.len(), "Saved debug input");
        }

        let mut data = input;

        for (step_idx, step) in self.steps.iter().take(num_steps).enumerate() {
            if self.context.verbose {
                println!("Running step: {} (processing {} items)", step.name(), data.len());
            }

            data = step.process(data, &self.context)?;
            self.save_debug_outputs(step_idx, step.name(), &data)?;

            if self.context.verbose {
                println!("  → {} items", data.len());
            }
        }

        Ok(data)
    }

    fn save_debug_outputs(&self, step_idx: usize, step_name: &str, data: &[PipelineData]) -> Result<()> {
        let Some(debug_config) = &self.context.debug else {
            return Ok(());
        };

        let step_dir_name = format!("{:02}_{}", step_idx + 1,
            step_name.to_lowercase().replace(' ', "_"));
        let step_dir = debug_config.output_dir.join(&step_dir_name);
        std::fs::create_dir_all(&step_dir)?;

        for (idx, item) in data.iter().enumerate() {
            let output_path = step_dir.join(format!("{:02}.png", idx + 1));
            item.image.save(&output_path)
                .map_err(|e| anyhow::anyhow!("Failed to save debug image: {}", e))?;
        }

        debug!(items = data.len(), dir = %step_dir_name, "Saved debug images");
        Ok(())
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
