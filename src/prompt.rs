//! Stylistic options and prompt construction.
//!
//! The builders here are pure: an [`OptionSelection`] or
//! [`RefinementSelection`] snapshot goes in, a single whitespace-normalized
//! instruction string comes out. Downstream prompt quality is sensitive to
//! stray formatting, so runs of whitespace are collapsed and the ends
//! trimmed before transmission.

/// Predefined outfit choices. Free text is equally valid.
pub const OUTFITS: &[&str] = &[
    "a dark business suit with a white shirt",
    "a charcoal blazer over a light sweater",
    "a black turtleneck",
    "a light gray suit with an open collar",
    "smart business-casual attire",
];

/// Predefined background choices.
pub const BACKGROUNDS: &[&str] = &[
    "a neutral light gray studio backdrop",
    "a softly blurred modern office",
    "a dark charcoal studio backdrop",
    "a warm beige studio backdrop",
    "an outdoor scene with soft bokeh",
];

/// Predefined lighting choices.
pub const LIGHTING: &[&str] = &[
    "soft diffused studio lighting",
    "warm golden-hour lighting",
    "dramatic side lighting",
    "bright high-key lighting",
    "moody low-key lighting",
];

/// Predefined view changes offered for regeneration.
pub const VIEW_CHANGES: &[&str] = &[
    "face the camera directly",
    "turn the head slightly to the left",
    "turn the head slightly to the right",
    "show a three-quarter view",
    "show a side profile",
];

/// What to do about headwear in the generated headshot.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum HeadwearChoice {
    /// Leave headwear as it appears in the source photo.
    #[default]
    NoPreference,
    /// Remove whatever headwear the person is wearing.
    Remove,
    /// Put the specified headwear on the person.
    Wear(String),
}

impl HeadwearChoice {
    /// Maps a raw option value onto a headwear intent.
    ///
    /// UI and CLI layers deal in strings; this is the one place those
    /// strings are interpreted.
    pub fn from_option_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "" | "none" | "no preference" => Self::NoPreference,
            "remove" => Self::Remove,
            _ => Self::Wear(value.trim().to_string()),
        }
    }

    fn sentence(&self) -> Option<String> {
        match self {
            Self::NoPreference => None,
            Self::Remove => Some("Remove any headwear the person is wearing.".into()),
            Self::Wear(item) => Some(format!("The person is wearing {item} on their head.")),
        }
    }
}

/// Snapshot of the stylistic options at the moment generation is triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionSelection {
    /// Outfit description.
    pub outfit: String,
    /// Background description.
    pub background: String,
    /// Lighting description.
    pub lighting: String,
    /// Headwear intent.
    pub headwear: HeadwearChoice,
}

impl Default for OptionSelection {
    fn default() -> Self {
        Self {
            outfit: OUTFITS[0].into(),
            background: BACKGROUNDS[0].into(),
            lighting: LIGHTING[0].into(),
            headwear: HeadwearChoice::NoPreference,
        }
    }
}

impl OptionSelection {
    /// Sets the outfit.
    pub fn with_outfit(mut self, outfit: impl Into<String>) -> Self {
        self.outfit = outfit.into();
        self
    }

    /// Sets the background.
    pub fn with_background(mut self, background: impl Into<String>) -> Self {
        self.background = background.into();
        self
    }

    /// Sets the lighting.
    pub fn with_lighting(mut self, lighting: impl Into<String>) -> Self {
        self.lighting = lighting.into();
        self
    }

    /// Sets the headwear intent.
    pub fn with_headwear(mut self, headwear: HeadwearChoice) -> Self {
        self.headwear = headwear;
        self
    }
}

/// Snapshot of the regeneration controls.
///
/// Both a free-text instruction and a predefined view change can be set at
/// once; non-empty free text always wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefinementSelection {
    /// Free-text instruction; may be empty.
    pub custom_instruction: String,
    /// Predefined view change, used when no custom text is given.
    pub view_change: String,
}

impl RefinementSelection {
    /// A refinement using one of the predefined view changes.
    pub fn view(view_change: impl Into<String>) -> Self {
        Self {
            custom_instruction: String::new(),
            view_change: view_change.into(),
        }
    }

    /// A refinement from a free-text instruction.
    pub fn custom(instruction: impl Into<String>) -> Self {
        Self {
            custom_instruction: instruction.into(),
            view_change: String::new(),
        }
    }

    /// Sets the free-text instruction.
    pub fn with_custom(mut self, instruction: impl Into<String>) -> Self {
        self.custom_instruction = instruction.into();
        self
    }

    /// The instruction that will reach the model.
    pub fn instruction(&self) -> &str {
        let custom = self.custom_instruction.trim();
        if custom.is_empty() {
            self.view_change.trim()
        } else {
            custom
        }
    }
}

/// Builds the instruction for the initial photo-to-headshot generation.
pub fn headshot_prompt(selection: &OptionSelection) -> String {
    let headwear = selection.headwear.sentence().unwrap_or_default();
    normalize_whitespace(&format!(
        "Transform the person in this photo into a professional studio headshot. \
         The person is wearing {outfit}. {headwear} \
         The background is {background}. Light the portrait with {lighting}. \
         Keep the person's facial identity, facial expression, and any visible \
         tattoos exactly as in the source photo. Preserve the person's ethnicity. \
         Produce a polished, high-resolution portrait.",
        outfit = selection.outfit,
        headwear = headwear,
        background = selection.background,
        lighting = selection.lighting,
    ))
}

/// Builds the instruction for modifying an already-generated headshot.
pub fn refinement_prompt(refinement: &RefinementSelection) -> String {
    normalize_whitespace(&format!(
        "This image is an AI-generated professional headshot. \
         Adjust it as follows: {instruction}. \
         Keep the outfit, headwear, background, and lighting exactly the same. \
         Keep the person's facial identity, facial expression, visible tattoos, \
         and ethnicity unchanged.",
        instruction = refinement.instruction(),
    ))
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
