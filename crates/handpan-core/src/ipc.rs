use handpan_domain_harmony::{CategorizedChords, NotationStyle};
use handpan_domain_notation::ParseDiagnostic;
use handpan_ports::playback::PlaybackSettings;
use handpan_ports::storage::{CompositionDto, ProgressionItemDto};
use handpan_ports::types::{AudioTime, Bpm, LayoutDto, PercussionHand};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    LoadLayout { layout: LayoutDto },
    LoadScaleTemplate { template: String, key: String },
    /// Emits `LayoutsUpdated` with built-in and custom layouts.
    ListLayouts,
    SelectLayout { id: String },
    SaveCustomLayout { layout: LayoutDto },
    DeleteCustomLayout { id: String },
    AddPhrase {
        text: String,
        label: Option<String>,
        repeats: Option<u32>,
    },
    AddChord {
        name: String,
        style: NotationStyle,
        label: Option<String>,
    },
    UpdateStep {
        index: usize,
        label: String,
        text: String,
        repeats: Option<u32>,
    },
    RemoveStep { index: usize },
    MoveStep { from: usize, to: usize },
    ClearProgression,
    ImportProgression { items: Vec<ProgressionItemDto> },
    ExportProgression,
    SetTempo { bpm: u32 },
    SetLoop { enabled: bool },
    SetDefaultRepeats { repeats: u32 },
    Play,
    Stop,
    SaveSession,
    RestoreSession,
    SaveComposition { name: String, category: String },
    LoadComposition { id: String },
    DeleteComposition { id: String },
    ListCompositions,
}

/// Progression card as shown to the UI.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepView {
    pub label: String,
    pub text: String,
    pub repeat_count: Option<u32>,
    pub event_count: usize,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    LayoutLoaded {
        layout: LayoutDto,
        dings: Vec<String>,
        tone_circle: Vec<String>,
        chords: CategorizedChords,
    },
    LayoutsUpdated { layouts: Vec<LayoutDto> },
    ProgressionUpdated { steps: Vec<StepView> },
    ProgressionExported { items: Vec<ProgressionItemDto> },
    ParseDiagnostics {
        step_index: usize,
        diagnostics: Vec<ParseDiagnostic>,
    },
    PlaybackStateUpdated {
        playing: bool,
        tempo: Bpm,
        settings: PlaybackSettings,
    },
    StepAdvanced {
        step_index: usize,
        label: String,
        at: AudioTime,
        repeats: u32,
    },
    NoteTriggered { label: String, at: AudioTime },
    PercussionTriggered {
        hand: PercussionHand,
        ghost: bool,
        at: AudioTime,
    },
    PlaybackStopped,
    CompositionsUpdated { compositions: Vec<CompositionDto> },
}
