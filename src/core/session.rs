//! Session state machine.
//!
//! Pure, synchronous state: every mutation is a named transition and no I/O
//! happens here. Long-running work is split into `begin_*`, which hands out a
//! ticket, and `complete_*`, which applies the outcome only if the ticket is
//! still the latest one for its category. A photo selection or reset bumps the
//! epoch, so every outstanding ticket goes stale at once.

use crate::domain::model::{
    AnalysisResult, EncodedImage, FaceAnalysis, FacialHair, Gender, GeneratedImage,
    HairstyleRecommendation, UserPreferences,
};
use crate::utils::error::{ErrorKind, Result, StyleCutError};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    AwaitingPreferences,
    Analyzing,
    Results,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Idle => "idle",
            Phase::AwaitingPreferences => "awaiting preferences",
            Phase::Analyzing => "analyzing",
            Phase::Results => "showing results",
        };
        f.write_str(name)
    }
}

/// 試穿覆蓋層，與主流程狀態互相獨立
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TryOnState {
    Closed,
    Generating {
        seq: u64,
        style_id: String,
        style_name: String,
    },
    /// `image` 為 None 表示生成失敗，可重試
    Ready {
        style_id: String,
        style_name: String,
        image: Option<GeneratedImage>,
    },
}

impl TryOnState {
    pub fn is_open(&self) -> bool {
        !matches!(self, TryOnState::Closed)
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, TryOnState::Generating { .. })
    }

    pub fn image(&self) -> Option<&GeneratedImage> {
        match self {
            TryOnState::Ready { image, .. } => image.as_ref(),
            _ => None,
        }
    }

    pub fn style_id(&self) -> Option<&str> {
        match self {
            TryOnState::Closed => None,
            TryOnState::Generating { style_id, .. } | TryOnState::Ready { style_id, .. } => {
                Some(style_id)
            }
        }
    }
}

/// 顯示給使用者的錯誤
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SurfacedError {
    pub kind: ErrorKind,
    pub message: String,
}

impl SurfacedError {
    fn from_error(err: &StyleCutError) -> Self {
        Self {
            kind: err.kind(),
            message: err.user_friendly_message(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    Applied,
    Stale,
}

impl Completion {
    pub fn is_applied(&self) -> bool {
        matches!(self, Completion::Applied)
    }
}

#[derive(Debug, Clone)]
pub struct AnalysisTicket {
    pub epoch: u64,
    pub seq: u64,
    pub image: EncodedImage,
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone)]
pub struct CustomStyleTicket {
    pub epoch: u64,
    pub description: String,
    pub analysis: FaceAnalysis,
    pub preferences: UserPreferences,
}

#[derive(Debug, Clone)]
pub struct TryOnTicket {
    pub epoch: u64,
    pub seq: u64,
    pub style_id: String,
    pub style_name: String,
    pub image: EncodedImage,
    pub gender: Gender,
    pub facial_hair: FacialHair,
}

#[derive(Debug, Clone)]
pub struct Session {
    phase: Phase,
    preferences: UserPreferences,
    image: Option<EncodedImage>,
    result: Option<AnalysisResult>,
    try_on: TryOnState,
    error: Option<SurfacedError>,
    custom_pending: bool,
    epoch: u64,
    analysis_seq: u64,
    try_on_seq: u64,
}

impl Default for Session {
    fn default() -> Self {
        Self::new(UserPreferences::default())
    }
}

impl Session {
    pub fn new(preferences: UserPreferences) -> Self {
        Self {
            phase: Phase::Idle,
            preferences,
            image: None,
            result: None,
            try_on: TryOnState::Closed,
            error: None,
            custom_pending: false,
            epoch: 0,
            analysis_seq: 0,
            try_on_seq: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn preferences(&self) -> &UserPreferences {
        &self.preferences
    }

    pub fn image(&self) -> Option<&EncodedImage> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn recommendations(&self) -> &[HairstyleRecommendation] {
        self.result
            .as_ref()
            .map(|r| r.recommendations.as_slice())
            .unwrap_or_default()
    }

    pub fn try_on(&self) -> &TryOnState {
        &self.try_on
    }

    pub fn error(&self) -> Option<&SurfacedError> {
        self.error.as_ref()
    }

    pub fn is_custom_style_pending(&self) -> bool {
        self.custom_pending
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// 丟棄目前照片與所有結果，讓進行中的請求全部失效
    fn invalidate(&mut self) {
        self.epoch += 1;
        self.phase = Phase::Idle;
        self.image = None;
        self.result = None;
        self.try_on = TryOnState::Closed;
        self.custom_pending = false;
    }

    /// 任何狀態下選擇新照片：先丟棄舊結果，再進入 AwaitingPreferences
    pub fn select_photo(&mut self, image: EncodedImage) {
        if self.result.is_some() || self.image.is_some() {
            tracing::info!("🔄 New photo selected, discarding previous session results");
        }
        self.invalidate();
        self.image = Some(image);
        self.error = None;
        self.phase = Phase::AwaitingPreferences;
    }

    /// 照片驗證失敗不算新上傳：只顯示錯誤，目前的照片與結果保留
    pub fn reject_photo(&mut self, err: &StyleCutError) {
        self.error = Some(SurfacedError::from_error(err));
    }

    pub fn reset(&mut self) {
        self.invalidate();
        self.error = None;
    }

    pub fn set_preferences(&mut self, preferences: UserPreferences) {
        self.preferences = preferences;
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    pub fn begin_analysis(&mut self) -> Result<AnalysisTicket> {
        if self.phase != Phase::AwaitingPreferences {
            return Err(StyleCutError::invalid_transition("start analysis", self.phase));
        }
        let Some(image) = self.image.clone() else {
            return Err(StyleCutError::invalid_transition("start analysis", self.phase));
        };

        self.analysis_seq += 1;
        self.phase = Phase::Analyzing;
        self.error = None;

        Ok(AnalysisTicket {
            epoch: self.epoch,
            seq: self.analysis_seq,
            image,
            preferences: self.preferences,
        })
    }

    pub fn complete_analysis(
        &mut self,
        ticket: &AnalysisTicket,
        outcome: Result<AnalysisResult>,
    ) -> Completion {
        if ticket.epoch != self.epoch
            || ticket.seq != self.analysis_seq
            || self.phase != Phase::Analyzing
        {
            tracing::debug!("⏭️ Discarding stale analysis result (seq {})", ticket.seq);
            return Completion::Stale;
        }

        match outcome {
            Ok(result) => {
                self.result = Some(result);
                self.phase = Phase::Results;
            }
            Err(err) => {
                let err = err.into_kind(ErrorKind::Analysis);
                tracing::warn!("❌ Analysis failed: {}", err);
                self.invalidate();
                self.error = Some(SurfacedError::from_error(&err));
            }
        }
        Completion::Applied
    }

    /// 空白描述不是錯誤，只是不做任何事（返回 None）
    pub fn begin_custom_style(&mut self, description: &str) -> Result<Option<CustomStyleTicket>> {
        let description = description.trim();
        if description.is_empty() {
            return Ok(None);
        }

        let Some(result) = self.result.as_ref().filter(|_| self.phase == Phase::Results) else {
            return Err(StyleCutError::invalid_transition("create a custom style", self.phase));
        };
        if self.custom_pending {
            return Err(StyleCutError::invalid_transition(
                "create another custom style",
                "still generating the previous one",
            ));
        }

        let ticket = CustomStyleTicket {
            epoch: self.epoch,
            description: description.to_string(),
            analysis: result.analysis.clone(),
            preferences: self.preferences,
        };
        self.custom_pending = true;
        Ok(Some(ticket))
    }

    pub fn complete_custom_style(
        &mut self,
        ticket: &CustomStyleTicket,
        outcome: Result<HairstyleRecommendation>,
    ) -> Completion {
        if ticket.epoch != self.epoch || !self.custom_pending {
            tracing::debug!("⏭️ Discarding stale custom style for '{}'", ticket.description);
            return Completion::Stale;
        }
        self.custom_pending = false;

        match (outcome, self.result.as_mut()) {
            (Ok(recommendation), Some(result)) => {
                let added = result.prepend(recommendation);
                tracing::info!("➕ Custom style '{}' added as {}", added.name, added.id);
            }
            (Ok(_), None) => return Completion::Stale,
            (Err(err), _) => {
                // 只記錄，不顯示
                tracing::warn!("⚠️ Custom style failed: {}", err);
            }
        }
        Completion::Applied
    }

    pub fn begin_try_on(&mut self, style_id: &str) -> Result<TryOnTicket> {
        if self.phase != Phase::Results {
            return Err(StyleCutError::invalid_transition("start a try-on", self.phase));
        }
        let (Some(result), Some(image)) = (self.result.as_ref(), self.image.as_ref()) else {
            return Err(StyleCutError::invalid_transition("start a try-on", self.phase));
        };
        let Some(style) = result.find(style_id) else {
            return Err(StyleCutError::invalid_transition(
                &format!("try on unknown style '{}'", style_id),
                self.phase,
            ));
        };

        self.try_on_seq += 1;
        let ticket = TryOnTicket {
            epoch: self.epoch,
            seq: self.try_on_seq,
            style_id: style.id.clone(),
            style_name: style.name.clone(),
            image: image.clone(),
            gender: self.preferences.gender,
            facial_hair: self.preferences.facial_hair,
        };

        if self.try_on.is_generating() {
            tracing::debug!("🔁 Superseding in-flight try-on with seq {}", ticket.seq);
        }
        self.try_on = TryOnState::Generating {
            seq: ticket.seq,
            style_id: ticket.style_id.clone(),
            style_name: ticket.style_name.clone(),
        };
        Ok(ticket)
    }

    pub fn complete_try_on(
        &mut self,
        ticket: &TryOnTicket,
        outcome: Result<GeneratedImage>,
    ) -> Completion {
        let current = matches!(
            &self.try_on,
            TryOnState::Generating { seq, .. } if *seq == ticket.seq
        );
        if ticket.epoch != self.epoch || !current {
            tracing::debug!("⏭️ Discarding stale try-on result (seq {})", ticket.seq);
            return Completion::Stale;
        }

        let image = match outcome {
            Ok(image) => Some(image),
            Err(err) => {
                tracing::warn!("⚠️ Try-on for '{}' failed: {}", ticket.style_name, err);
                None
            }
        };
        self.try_on = TryOnState::Ready {
            style_id: ticket.style_id.clone(),
            style_name: ticket.style_name.clone(),
            image,
        };
        Completion::Applied
    }

    pub fn dismiss_try_on(&mut self) {
        self.try_on = TryOnState::Closed;
    }
}
