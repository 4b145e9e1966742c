use crate::config::SchedulerConfig;
use crate::ipc::{Command, Event, StepView};
use crate::observer::{NoticeReceiver, ObserverQueue, DEFAULT_NOTICE_CAPACITY};
use crate::scheduler::PlaybackScheduler;
use handpan_domain_harmony::{categorize, generate_chords, Chord, NotationStyle};
use handpan_domain_notation::{
    default_step_label, e_amara, find_template, predefined_layouts, starter_layout_for,
    InstrumentLayout, LayoutError, NotationParser, Note, ParseDiagnostic, ProgressionStep,
    ScaleError,
};
use handpan_ports::audio::AudioSink;
use handpan_ports::playback::{PlaybackNotice, PlaybackObserver, PlaybackSettings};
use handpan_ports::storage::{
    CompositionDto, ProgressionItemDto, SessionDto, SessionStore, StorageError,
};
use handpan_ports::timer::WakeTimer;
use handpan_ports::types::{Bpm, LayoutDto};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("layout error: {0}")]
    Layout(#[from] LayoutError),
    #[error("scale error: {0}")]
    Scale(#[from] ScaleError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("no step at index {0}")]
    StepOutOfRange(usize),
    #[error("chord not available on this layout: {0}")]
    UnknownChord(String),
    #[error("no layout with id {0}")]
    UnknownLayout(String),
    #[error("no session store configured")]
    NoStorage,
}

/// Application context: current instrument, progression and playback.
pub struct HandpanApp {
    layout: InstrumentLayout,
    parser: NotationParser,
    chords: Vec<Chord>,
    steps: Vec<ProgressionStep>,
    tempo: Bpm,
    settings: PlaybackSettings,
    scheduler: Arc<Mutex<PlaybackScheduler>>,
    notices: NoticeReceiver,
    storage: Option<Box<dyn SessionStore>>,
    events: VecDeque<Event>,
}

impl HandpanApp {
    pub fn new(
        sink: Arc<dyn AudioSink>,
        timer: Arc<dyn WakeTimer>,
        storage: Option<Box<dyn SessionStore>>,
        config: SchedulerConfig,
    ) -> Result<Self, AppError> {
        let (queue, notices) = ObserverQueue::new(DEFAULT_NOTICE_CAPACITY);
        let mut scheduler = PlaybackScheduler::new(sink, timer, config);
        scheduler.set_observer(Some(Arc::new(queue) as Arc<dyn PlaybackObserver>));

        let layout = InstrumentLayout::from_dto(e_amara())?;
        let parser = NotationParser::new(&layout);
        let chords = generate_chords(&layout.notes());

        let mut app = Self {
            layout,
            parser,
            chords,
            steps: Vec::new(),
            tempo: Bpm::default(),
            settings: PlaybackSettings::default(),
            scheduler: Arc::new(Mutex::new(scheduler)),
            notices,
            storage,
            events: VecDeque::new(),
        };

        if let Err(err) = app.seed_custom_layouts() {
            log::warn!("app: could not seed custom layouts: {err}");
        }

        let stored = match app.storage.as_ref() {
            Some(storage) => storage.load_session().unwrap_or_else(|err| {
                log::warn!("app: could not load session: {err}");
                None
            }),
            None => None,
        };
        if let Some(session) = stored {
            if let Err(err) = app.apply_session(session) {
                log::warn!("app: stored session rejected: {err}");
            }
        }

        app.emit_layout();
        app.emit_progression();
        app.emit_playback_state();
        if let Err(err) = app.emit_layouts() {
            log::warn!("app: could not list layouts: {err}");
        }
        Ok(app)
    }

    /// Shared handle for a [`crate::runtime::TimerDriver`].
    pub fn scheduler(&self) -> Arc<Mutex<PlaybackScheduler>> {
        self.scheduler.clone()
    }

    pub fn layout(&self) -> &InstrumentLayout {
        &self.layout
    }

    pub fn chords(&self) -> &[Chord] {
        &self.chords
    }

    pub fn steps(&self) -> &[ProgressionStep] {
        &self.steps
    }

    pub fn tempo(&self) -> Bpm {
        self.tempo
    }

    pub fn settings(&self) -> PlaybackSettings {
        self.settings
    }

    /// Notation text for a chord of the current layout.
    pub fn chord_notation(&self, name: &str, style: NotationStyle) -> Option<String> {
        self.chords
            .iter()
            .find(|chord| chord.name == name)
            .map(|chord| chord.to_notation(style))
    }

    /// Built-in layouts followed by the stored custom ones.
    pub fn all_layouts(&self) -> Result<Vec<LayoutDto>, AppError> {
        let mut layouts = predefined_layouts();
        if let Some(storage) = self.storage.as_deref() {
            layouts.extend(storage.list_layouts()?);
        }
        Ok(layouts)
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.lock().is_playing()
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), AppError> {
        match cmd {
            Command::LoadLayout { layout } => {
                let layout = InstrumentLayout::from_dto(layout)?;
                self.set_layout(layout);
            }
            Command::LoadScaleTemplate { template, key } => {
                let template =
                    find_template(&template).ok_or(ScaleError::UnknownTemplate(template))?;
                let layout = template.build_layout(&key)?;
                self.set_layout(layout);
            }
            Command::ListLayouts => {
                self.emit_layouts()?;
            }
            Command::SelectLayout { id } => {
                let dto = self
                    .all_layouts()?
                    .into_iter()
                    .find(|layout| layout.id.as_deref() == Some(id.as_str()))
                    .ok_or(AppError::UnknownLayout(id))?;
                let layout = InstrumentLayout::from_dto(dto)?;
                self.set_layout(layout);
            }
            Command::SaveCustomLayout { layout } => {
                InstrumentLayout::from_dto(layout.clone())?;
                self.storage()?.save_layout(layout)?;
                self.emit_layouts()?;
            }
            Command::DeleteCustomLayout { id } => {
                self.storage()?.delete_layout(&id)?;
                self.emit_layouts()?;
            }
            Command::AddPhrase {
                text,
                label,
                repeats,
            } => {
                self.push_step(label, text, repeats);
            }
            Command::AddChord { name, style, label } => {
                let text = self
                    .chord_notation(&name, style)
                    .ok_or(AppError::UnknownChord(name))?;
                self.push_step(label, text, None);
            }
            Command::UpdateStep {
                index,
                label,
                text,
                repeats,
            } => {
                if index >= self.steps.len() {
                    return Err(AppError::StepOutOfRange(index));
                }
                let (step, diagnostics) =
                    ProgressionStep::from_text(label, text, &self.parser, repeats);
                self.steps[index] = step;
                self.emit_diagnostics(index, diagnostics);
                self.emit_progression();
            }
            Command::RemoveStep { index } => {
                if index >= self.steps.len() {
                    return Err(AppError::StepOutOfRange(index));
                }
                self.steps.remove(index);
                self.emit_progression();
            }
            Command::MoveStep { from, to } => {
                if from >= self.steps.len() {
                    return Err(AppError::StepOutOfRange(from));
                }
                if to >= self.steps.len() {
                    return Err(AppError::StepOutOfRange(to));
                }
                let step = self.steps.remove(from);
                self.steps.insert(to, step);
                self.emit_progression();
            }
            Command::ClearProgression => {
                self.steps.clear();
                self.emit_progression();
            }
            Command::ImportProgression { items } => {
                self.replace_progression(&items);
                self.emit_progression();
            }
            Command::ExportProgression => {
                self.events.push_back(Event::ProgressionExported {
                    items: self.export_progression(),
                });
            }
            Command::SetTempo { bpm } => {
                self.tempo = Bpm::new(bpm);
                self.scheduler.lock().set_bpm(self.tempo);
                self.emit_playback_state();
            }
            Command::SetLoop { enabled } => {
                self.settings.loop_enabled = enabled;
                self.scheduler.lock().set_settings(self.settings);
                self.emit_playback_state();
            }
            Command::SetDefaultRepeats { repeats } => {
                self.settings.default_repeats = repeats.max(1);
                self.scheduler.lock().set_settings(self.settings);
                self.emit_playback_state();
            }
            Command::Play => {
                {
                    let mut scheduler = self.scheduler.lock();
                    scheduler.set_bpm(self.tempo);
                    scheduler.start(self.steps.clone(), self.settings);
                }
                self.emit_playback_state();
            }
            Command::Stop => {
                self.scheduler.lock().stop();
                self.emit_playback_state();
            }
            Command::SaveSession => {
                let session = self.session_dto();
                self.storage()?.save_session(&session)?;
            }
            Command::RestoreSession => {
                let session = self.storage()?.load_session()?;
                match session {
                    Some(session) => {
                        self.apply_session(session)?;
                        self.emit_layout();
                        self.emit_progression();
                        self.emit_playback_state();
                    }
                    None => log::debug!("app: no stored session to restore"),
                }
            }
            Command::SaveComposition { name, category } => {
                let composition = CompositionDto {
                    id: String::new(),
                    name,
                    category,
                    layout: self.layout.to_dto(),
                    progression: self.export_progression(),
                    tempo: self.tempo,
                };
                self.storage()?.save_composition(composition)?;
                self.emit_compositions()?;
            }
            Command::LoadComposition { id } => {
                let composition = self
                    .storage()?
                    .list_compositions()?
                    .into_iter()
                    .find(|composition| composition.id == id)
                    .ok_or(StorageError::NotFound(id))?;
                self.apply_session(SessionDto {
                    layout: composition.layout,
                    progression: composition.progression,
                    tempo: composition.tempo,
                })?;
                self.emit_layout();
                self.emit_progression();
                self.emit_playback_state();
            }
            Command::DeleteComposition { id } => {
                self.storage()?.delete_composition(&id)?;
                self.emit_compositions()?;
            }
            Command::ListCompositions => {
                self.emit_compositions()?;
            }
        }
        Ok(())
    }

    /// Pending UI events, including playback notices raised since the last call.
    pub fn drain_events(&mut self) -> Vec<Event> {
        for notice in self.notices.drain() {
            let event = match notice {
                PlaybackNotice::NoteTriggered(note) => Event::NoteTriggered {
                    label: note.label,
                    at: note.at,
                },
                PlaybackNotice::PercussionTriggered(hit) => Event::PercussionTriggered {
                    hand: hit.hand,
                    ghost: hit.ghost,
                    at: hit.at,
                },
                PlaybackNotice::StepAdvanced(step) => Event::StepAdvanced {
                    step_index: step.step_index,
                    label: step.label,
                    at: step.at,
                    repeats: step.repeats,
                },
                PlaybackNotice::Stopped => Event::PlaybackStopped,
            };
            self.events.push_back(event);
        }
        self.events.drain(..).collect()
    }

    /// Progression in exported form; source text is kept verbatim when present.
    pub fn export_progression(&self) -> Vec<ProgressionItemDto> {
        self.steps.iter().map(ProgressionStep::to_item).collect()
    }

    fn storage(&self) -> Result<&dyn SessionStore, AppError> {
        self.storage.as_deref().ok_or(AppError::NoStorage)
    }

    fn seed_custom_layouts(&self) -> Result<(), AppError> {
        let Some(storage) = self.storage.as_deref() else {
            return Ok(());
        };
        let custom = storage.list_layouts()?;
        storage.save_layout(starter_layout_for(&custom))?;
        Ok(())
    }

    fn session_dto(&self) -> SessionDto {
        SessionDto {
            layout: self.layout.to_dto(),
            progression: self.export_progression(),
            tempo: self.tempo,
        }
    }

    fn apply_session(&mut self, session: SessionDto) -> Result<(), AppError> {
        let layout = InstrumentLayout::from_dto(session.layout)?;
        self.scheduler.lock().stop();
        self.install_layout(layout);
        self.tempo = Bpm::new(session.tempo.get());
        self.scheduler.lock().set_bpm(self.tempo);
        self.replace_progression(&session.progression);
        Ok(())
    }

    fn set_layout(&mut self, layout: InstrumentLayout) {
        self.scheduler.lock().stop();
        self.install_layout(layout);

        for index in 0..self.steps.len() {
            let diagnostics = self.steps[index].reparse(&self.parser);
            self.emit_diagnostics(index, diagnostics);
        }

        self.emit_layout();
        self.emit_progression();
        self.emit_playback_state();
    }

    fn install_layout(&mut self, layout: InstrumentLayout) {
        self.parser = NotationParser::new(&layout);
        self.chords = generate_chords(&layout.notes());
        log::debug!(
            "app: layout '{}' with {} note(s), {} chord(s)",
            layout.name(),
            layout.slots().len(),
            self.chords.len()
        );
        self.layout = layout;
    }

    fn replace_progression(&mut self, items: &[ProgressionItemDto]) {
        self.steps.clear();
        for item in items {
            let (step, diagnostics) = ProgressionStep::from_item(item, &self.parser);
            self.steps.push(step);
            self.emit_diagnostics(self.steps.len() - 1, diagnostics);
        }
    }

    fn push_step(&mut self, label: Option<String>, text: String, repeats: Option<u32>) {
        let index = self.steps.len();
        let label = label.unwrap_or_else(|| default_step_label(index));
        let (step, diagnostics) = ProgressionStep::from_text(label, text, &self.parser, repeats);
        self.steps.push(step);
        self.emit_diagnostics(index, diagnostics);
        self.emit_progression();
    }

    fn emit_diagnostics(&mut self, step_index: usize, diagnostics: Vec<ParseDiagnostic>) {
        if diagnostics.is_empty() {
            return;
        }
        self.events.push_back(Event::ParseDiagnostics {
            step_index,
            diagnostics,
        });
    }

    fn emit_layout(&mut self) {
        let numbering = self.layout.numbering();
        self.events.push_back(Event::LayoutLoaded {
            layout: self.layout.to_dto(),
            dings: note_names(&numbering.dings),
            tone_circle: note_names(&numbering.tone_circle),
            chords: categorize(&self.chords),
        });
    }

    fn emit_progression(&mut self) {
        let steps = self
            .steps
            .iter()
            .map(|step| StepView {
                label: step.label.clone(),
                text: step.text(),
                repeat_count: step.repeat_count,
                event_count: step.events.len(),
            })
            .collect();
        self.events.push_back(Event::ProgressionUpdated { steps });
    }

    fn emit_playback_state(&mut self) {
        let playing = self.scheduler.lock().is_playing();
        self.events.push_back(Event::PlaybackStateUpdated {
            playing,
            tempo: self.tempo,
            settings: self.settings,
        });
    }

    fn emit_layouts(&mut self) -> Result<(), AppError> {
        let layouts = self.all_layouts()?;
        self.events.push_back(Event::LayoutsUpdated { layouts });
        Ok(())
    }

    fn emit_compositions(&mut self) -> Result<(), AppError> {
        let compositions = self.storage()?.list_compositions()?;
        self.events.push_back(Event::CompositionsUpdated { compositions });
        Ok(())
    }
}

fn note_names(notes: &[Note]) -> Vec<String> {
    notes.iter().map(Note::to_string).collect()
}
