//! Scene requests and Director scene designs.

use quill_error::{ValidationError, ValidationErrorKind};
use serde::{Deserialize, Serialize};

/// Maximum characters in a request intention.
pub const MAX_INTENTION_CHARS: usize = 4000;
/// Maximum target word count.
pub const MAX_WORD_COUNT: i64 = 5000;
/// Maximum number of required events.
pub const MAX_REQUIRED_EVENTS: usize = 20;
/// Maximum characters in a single required event.
pub const MAX_EVENT_CHARS: usize = 300;
/// Chapter used when the request leaves it at zero.
pub const DEFAULT_CHAPTER: i64 = 1;
/// Scene used when the request leaves it at zero.
pub const DEFAULT_SCENE: i64 = 1;
/// Word count used when the request leaves it at zero.
pub const DEFAULT_WORD_COUNT: i64 = 1000;

/// A caller's description of the scene to generate.
///
/// Deserialized leniently: every field is optional on the wire. Call
/// [`SceneRequest::validate`] before handing it to the pipeline.
///
/// # Examples
///
/// ```
/// use quill_core::SceneRequest;
///
/// let request: SceneRequest = serde_json::from_str(r#"{"intention": "  A duel at dawn "}"#)?;
/// let request = request.validate(|| "req-1".to_string())?;
///
/// assert_eq!(request.id, "req-1");
/// assert_eq!(request.intention, "A duel at dawn");
/// assert_eq!((request.chapter, request.scene, request.word_count), (1, 1, 1000));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneRequest {
    /// Scene identifier
    pub id: String,
    /// What should happen in the scene
    pub intention: String,
    /// Chapter number
    pub chapter: i64,
    /// Scene number within the chapter
    pub scene: i64,
    /// Target length in words
    pub word_count: i64,
    /// Point-of-view character
    pub pov_character: String,
    /// Mood tag
    pub mood: String,
    /// Plot events that must occur
    pub required_events: Vec<String>,
}

impl SceneRequest {
    /// Trim, check and default the request.
    ///
    /// `fallback_id` supplies the identifier when the body carries none.
    ///
    /// # Errors
    ///
    /// Returns the first rule the request breaks.
    pub fn validate(
        mut self,
        fallback_id: impl FnOnce() -> String,
    ) -> Result<Self, ValidationError> {
        self.id = self.id.trim().to_string();
        self.intention = self.intention.trim().to_string();
        self.pov_character = self.pov_character.trim().to_string();
        self.mood = self.mood.trim().to_string();

        if self.intention.is_empty() {
            return Err(ValidationError::new(ValidationErrorKind::MissingIntention));
        }
        let intention_chars = self.intention.chars().count();
        if intention_chars > MAX_INTENTION_CHARS {
            return Err(ValidationError::new(ValidationErrorKind::IntentionTooLong {
                max: MAX_INTENTION_CHARS,
                actual: intention_chars,
            }));
        }
        if self.chapter < 0 {
            return Err(ValidationError::new(ValidationErrorKind::NegativeChapter(
                self.chapter,
            )));
        }
        if self.scene < 0 {
            return Err(ValidationError::new(ValidationErrorKind::NegativeScene(
                self.scene,
            )));
        }
        if !(0..=MAX_WORD_COUNT).contains(&self.word_count) {
            return Err(ValidationError::new(
                ValidationErrorKind::WordCountOutOfRange {
                    max: MAX_WORD_COUNT,
                    actual: self.word_count,
                },
            ));
        }
        if self.required_events.len() > MAX_REQUIRED_EVENTS {
            return Err(ValidationError::new(ValidationErrorKind::TooManyEvents {
                max: MAX_REQUIRED_EVENTS,
                actual: self.required_events.len(),
            }));
        }

        let mut events = Vec::with_capacity(self.required_events.len());
        for (index, event) in self.required_events.iter().enumerate() {
            let event = event.trim();
            if event.chars().count() > MAX_EVENT_CHARS {
                return Err(ValidationError::new(ValidationErrorKind::EventTooLong {
                    index,
                    max: MAX_EVENT_CHARS,
                }));
            }
            if !event.is_empty() {
                events.push(event.to_string());
            }
        }
        self.required_events = events;

        if self.chapter == 0 {
            self.chapter = DEFAULT_CHAPTER;
        }
        if self.scene == 0 {
            self.scene = DEFAULT_SCENE;
        }
        if self.word_count == 0 {
            self.word_count = DEFAULT_WORD_COUNT;
        }
        if self.id.is_empty() {
            self.id = fallback_id();
        }

        Ok(self)
    }
}

/// Scene metadata block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneMeta {
    /// Scene identifier
    pub id: String,
    /// Chapter number
    pub chapter: i64,
    /// Position within the chapter
    pub sequence_in_chapter: i64,
    /// Working title
    pub title: String,
}

/// Narrative block.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Narrative {
    /// What the scene must accomplish
    pub objective: String,
    /// One-paragraph summary
    pub summary: String,
    /// Ordered key events
    pub key_events: Vec<String>,
    /// Information revealed to the reader
    pub revelations: Vec<String>,
    /// Hooks into later scenes
    pub hooks: Vec<String>,
}

/// Constraints the prose must respect.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneConstraints {
    /// Point-of-view character
    pub pov_character: String,
    /// Where the scene takes place
    pub location: String,
    /// Mood tag
    pub mood: String,
    /// Characters on stage
    pub characters_present: Vec<String>,
}

/// Continuity obligations.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Continuity {
    /// Established facts to repeat or honour
    pub facts_to_reinforce: Vec<String>,
    /// Foreshadowing ids to pay off
    pub foreshadowing_to_resolve: Vec<String>,
    /// New foreshadowing to introduce
    pub foreshadowing_to_plant: Vec<String>,
}

/// Optional stylistic guidance.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneStyle {
    /// Pacing tag
    pub pacing: String,
    /// Share of dialogue, 0.0 to 1.0
    pub dialogue_ratio: f64,
}

/// Structured scene design produced by the Director.
///
/// Every block defaults, so a partial JSON object still parses and an
/// unparseable response degrades to `SceneSpec::default()`.
///
/// # Examples
///
/// ```
/// use quill_core::SceneSpec;
///
/// let spec: SceneSpec = serde_json::from_str(r#"{"narrative": {"objective": "Escape"}}"#)?;
/// assert_eq!(spec.narrative.objective, "Escape");
/// assert!(spec.constraints.pov_character.is_empty());
/// assert!(SceneSpec::default().is_empty());
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneSpec {
    /// Metadata
    pub scene: SceneMeta,
    /// Narrative design
    pub narrative: Narrative,
    /// Constraints
    pub constraints: SceneConstraints,
    /// Continuity obligations
    pub continuity: Continuity,
    /// Style guidance
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<SceneStyle>,
}

impl SceneSpec {
    /// Whether this is the zero-value design.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}
