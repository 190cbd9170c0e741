use crate::geometry::Square;

/// The only response the drill defines; absence before the window closes
/// is treated as no-response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Response {
    Match,
}

/// Signal-detection outcome of one trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TrialOutcome {
    Hit,
    FalseAlarm,
    CorrectRejection,
    Miss,
}

impl TrialOutcome {
    pub fn is_correct(&self) -> bool {
        matches!(self, TrialOutcome::Hit | TrialOutcome::CorrectRejection)
    }
}

pub fn classify(is_target: bool, response: Option<Response>) -> TrialOutcome {
    match (is_target, response) {
        (true, Some(Response::Match)) => TrialOutcome::Hit,
        (false, Some(Response::Match)) => TrialOutcome::FalseAlarm,
        (false, None) => TrialOutcome::CorrectRejection,
        (true, None) => TrialOutcome::Miss,
    }
}

/// A classified trial record. Records are only created by closing an
/// [`ActiveTrial`], so every stored trial carries exactly one outcome.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trial {
    pub square: Square,
    pub is_target: bool,
    pub response: Option<Response>,
    pub outcome: TrialOutcome,
}

/// The stimulus currently on display, waiting for its response window to
/// close. Holds at most one recorded response.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ActiveTrial {
    pub square: Square,
    pub is_target: bool,
    response: Option<Response>,
}

impl ActiveTrial {
    pub fn new(square: Square, is_target: bool) -> Self {
        Self {
            square,
            is_target,
            response: None,
        }
    }

    /// Record the subject's response. Only the first response in the window
    /// counts; later ones are dropped.
    pub fn respond(&mut self, response: Response) {
        if self.response.is_none() {
            self.response = Some(response);
        }
    }

    pub fn response(&self) -> Option<Response> {
        self.response
    }

    /// Close the response window: classify with whatever response was
    /// recorded up to this moment and emit the trial record.
    pub fn finish(self) -> Trial {
        Trial {
            square: self.square,
            is_target: self.is_target,
            response: self.response,
            outcome: classify(self.is_target, self.response),
        }
    }
}
