use crate::controller::{Phase, Snapshot};
use crate::geometry::{PieceKind, Square, SquareColor, BOARD_FILES, BOARD_RANKS};
use itertools::Itertools;
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Read-only view over a controller snapshot. Renders the board, the
/// current stimulus with feedback coloring, and the session status lines.
/// Context mutation stays with the controller; this widget only draws.
pub struct SessionView<'a> {
    snapshot: Snapshot<'a>,
}

impl<'a> SessionView<'a> {
    pub fn new(snapshot: Snapshot<'a>) -> Self {
        Self { snapshot }
    }

    fn piece_letter(piece: PieceKind) -> &'static str {
        match piece {
            PieceKind::Knight => "N",
            PieceKind::Bishop => "B",
        }
    }

    fn stimulus_style(&self) -> Style {
        let bg = match self.snapshot.phase {
            Phase::Hit => Color::Green,
            Phase::FalseAlarm => Color::Red,
            _ => Color::Yellow,
        };
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    }

    fn board_lines(&self) -> Vec<Line<'static>> {
        let context = self.snapshot.context;
        let origin = context
            .rounds
            .get(&context.round_number)
            .map(|round| round.origin);
        let current = context.current_square;

        let mut lines = Vec::with_capacity(BOARD_RANKS as usize + 1);
        for rank in (0..BOARD_RANKS).rev() {
            let mut spans = vec![Span::styled(
                format!("{} ", rank + 1),
                Style::default().add_modifier(Modifier::DIM),
            )];
            for file in 0..BOARD_FILES {
                let square = match Square::new(file, rank) {
                    Some(square) => square,
                    None => continue,
                };
                let content = if origin == Some(square) {
                    format!("{} ", Self::piece_letter(self.snapshot.config.piece))
                } else {
                    "  ".to_string()
                };
                let style = if current == Some(square) {
                    self.stimulus_style()
                } else {
                    match square.color() {
                        SquareColor::Light => Style::default().bg(Color::Gray).fg(Color::Black),
                        SquareColor::Dark => Style::default().bg(Color::DarkGray).fg(Color::White),
                    }
                };
                spans.push(Span::styled(content, style));
            }
            lines.push(Line::from(spans));
        }

        let footer = (0..BOARD_FILES)
            .map(|file| format!("{} ", (b'a' + file) as char))
            .collect::<String>();
        lines.push(Line::from(Span::styled(
            format!("  {}", footer),
            Style::default().add_modifier(Modifier::DIM),
        )));
        lines
    }

    fn status_text(&self) -> String {
        let context = self.snapshot.context;
        let config = self.snapshot.config;
        let piece = config.piece.to_string().to_lowercase();
        match self.snapshot.phase {
            Phase::Idle => format!(
                "{} drill · {} rounds x {} trials · voice {}",
                piece,
                config.rounds,
                config.trials_per_round,
                if context.voice_enabled { "on" } else { "off" },
            ),
            Phase::Countdown => format!("starting in {}", context.countdown),
            Phase::StartingRound => format!(
                "round {} of {} · memorize the {}",
                context.round_number, config.rounds, piece,
            ),
            Phase::WaitingForResponse => format!(
                "round {}/{} · {} trials left · score {}",
                context.round_number, config.rounds, context.trials_remaining, context.score,
            ),
            Phase::Hit => "hit".to_string(),
            Phase::FalseAlarm => "false alarm".to_string(),
            Phase::GameOver => format!(
                "session over · accuracy {:.2}% · {} correct, {} mistakes",
                context.accuracy.unwrap_or(0.0),
                context.score,
                context.mistakes,
            ),
        }
    }

    fn round_summary(&self) -> String {
        self.snapshot
            .context
            .rounds
            .iter()
            .map(|(number, round)| {
                let correct = round
                    .trials
                    .iter()
                    .filter(|trial| trial.outcome.is_correct())
                    .count();
                format!("round {}: {}/{} from {}", number, correct, round.trials.len(), round.origin)
            })
            .join("   ")
    }

    fn help_text(&self) -> &'static str {
        match self.snapshot.phase {
            Phase::Idle => "(s)tart · (v)oice · (esc) quit",
            Phase::GameOver => "(r)estart · (esc) quit",
            _ => "space to signal a match · (esc) quit",
        }
    }
}

impl Widget for SessionView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .margin(1)
            .constraints(
                [
                    Constraint::Length(2),
                    Constraint::Length(BOARD_RANKS as u16 + 1),
                    Constraint::Length(2),
                    Constraint::Min(1),
                ]
                .as_ref(),
            )
            .split(area);

        let title = Paragraph::new(Span::styled(
            "boardsight",
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Center);
        title.render(chunks[0], buf);

        if self.snapshot.phase == Phase::GameOver {
            let summary = Paragraph::new(self.round_summary())
                .alignment(Alignment::Center)
                .style(Style::default().add_modifier(Modifier::ITALIC));
            summary.render(chunks[1], buf);
        } else {
            let board = Paragraph::new(self.board_lines()).alignment(Alignment::Center);
            board.render(chunks[1], buf);
        }

        let status_style = match self.snapshot.phase {
            Phase::Hit => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            Phase::FalseAlarm => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            _ => Style::default(),
        };
        let status = Paragraph::new(self.status_text())
            .style(status_style)
            .alignment(Alignment::Center);
        status.render(chunks[2], buf);

        let help = Paragraph::new(self.help_text())
            .style(Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC))
            .alignment(Alignment::Center);
        help.render(chunks[3], buf);
    }
}
