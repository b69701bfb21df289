//! In-memory relational store for club matchday data.
//!
//! Tables are `BTreeMap`s keyed by row id so iteration order is
//! deterministic; evaluations and stats history carry composite keys and
//! live in `Vec`s with replace-on-key upserts. The whole store serializes
//! to JSON so the CLI can load and persist complete datasets.
//!
//! Derived rows (rating stats, rating votes, stats history) are written by
//! full replacement only. Concurrent recomputation of the same key is
//! last-writer-wins and converges because the value is a pure function of
//! the base rows.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::models::{
    Attendance, AttendanceId, AttendanceRatingStats, AttendanceRatingVote, Club, ClubId,
    Evaluation, Goal, GoalId, Match, MatchClub, MatchClubId, MatchId, MemberType, Player,
    PlayerId, PlayerStatsHistory, UserId,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClubStore {
    #[serde(default)]
    pub clubs: BTreeMap<ClubId, Club>,
    #[serde(default)]
    pub matches: BTreeMap<MatchId, Match>,
    #[serde(default)]
    pub match_clubs: BTreeMap<MatchClubId, MatchClub>,
    #[serde(default)]
    pub players: BTreeMap<PlayerId, Player>,
    #[serde(default)]
    pub attendances: BTreeMap<AttendanceId, Attendance>,
    #[serde(default)]
    pub goals: BTreeMap<GoalId, Goal>,
    #[serde(default)]
    pub evaluations: Vec<Evaluation>,
    #[serde(default)]
    pub rating_stats: BTreeMap<AttendanceId, AttendanceRatingStats>,
    #[serde(default)]
    pub rating_votes: BTreeMap<AttendanceId, AttendanceRatingVote>,
    #[serde(default)]
    pub stats_history: Vec<PlayerStatsHistory>,
}

/// Resolved display identity for one attendance.
#[derive(Debug, Clone)]
pub struct DisplayIdentity {
    pub name: String,
    pub image_url: Option<String>,
    pub member_type: MemberType,
}

impl ClubStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- row accessors -------------------------------------------------

    pub fn club(&self, id: ClubId) -> Result<&Club> {
        self.clubs.get(&id).ok_or_else(|| CoreError::NotFound(format!("club {}", id)))
    }

    pub fn match_row(&self, id: MatchId) -> Result<&Match> {
        self.matches.get(&id).ok_or_else(|| CoreError::NotFound(format!("match {}", id)))
    }

    pub fn match_club(&self, id: MatchClubId) -> Result<&MatchClub> {
        self.match_clubs
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("match club {}", id)))
    }

    pub fn attendance(&self, id: AttendanceId) -> Result<&Attendance> {
        self.attendances
            .get(&id)
            .ok_or_else(|| CoreError::NotFound(format!("attendance {}", id)))
    }

    pub fn player(&self, id: PlayerId) -> Result<&Player> {
        self.players.get(&id).ok_or_else(|| CoreError::NotFound(format!("player {}", id)))
    }

    pub fn goal(&self, id: GoalId) -> Result<&Goal> {
        self.goals.get(&id).ok_or_else(|| CoreError::NotFound(format!("goal {}", id)))
    }

    // ---- inserts -------------------------------------------------------

    pub fn insert_club(&mut self, club: Club) {
        self.clubs.insert(club.id, club);
    }

    pub fn insert_match(&mut self, m: Match) {
        self.matches.insert(m.id, m);
    }

    pub fn insert_match_club(&mut self, side: MatchClub) {
        self.match_clubs.insert(side.id, side);
    }

    pub fn insert_player(&mut self, player: Player) {
        self.players.insert(player.id, player);
    }

    pub fn insert_attendance(&mut self, att: Attendance) {
        self.attendances.insert(att.id, att);
    }

    pub fn insert_goal(&mut self, goal: Goal) {
        self.goals.insert(goal.id, goal);
    }

    pub fn remove_goal(&mut self, id: GoalId) -> Result<Goal> {
        self.goals.remove(&id).ok_or_else(|| CoreError::NotFound(format!("goal {}", id)))
    }

    pub fn next_goal_id(&self) -> GoalId {
        self.goals.keys().next_back().copied().unwrap_or(0) + 1
    }

    // ---- relational queries --------------------------------------------

    /// All sides of one match, active and inactive.
    pub fn sides_of_match(&self, match_id: MatchId) -> Vec<&MatchClub> {
        self.match_clubs.values().filter(|mc| mc.match_id == match_id).collect()
    }

    pub fn attendances_of_side(&self, match_club_id: MatchClubId) -> Vec<&Attendance> {
        self.attendances.values().filter(|a| a.match_club_id == match_club_id).collect()
    }

    /// Evaluations other raters gave to this attendance.
    pub fn evaluations_received(&self, attendance_id: AttendanceId) -> Vec<&Evaluation> {
        self.evaluations.iter().filter(|e| e.attendance_id == attendance_id).collect()
    }

    /// Evaluations one rater gave within one match side.
    pub fn evaluations_given(
        &self,
        rater_user_id: UserId,
        match_club_id: MatchClubId,
    ) -> Vec<&Evaluation> {
        self.evaluations
            .iter()
            .filter(|e| e.rater_user_id == rater_user_id && e.match_club_id == match_club_id)
            .collect()
    }

    /// All goal events credited to this attendance as scorer.
    pub fn goals_scored_by(&self, attendance_id: AttendanceId) -> Vec<&Goal> {
        self.goals.values().filter(|g| g.attendance_id == attendance_id).collect()
    }

    /// Count of goals crediting this attendance with the assist.
    pub fn assists_by(&self, attendance_id: AttendanceId) -> u32 {
        self.goals
            .values()
            .filter(|g| g.assist_attendance_id == Some(attendance_id))
            .count() as u32
    }

    /// The rater's own attendance within one match side, if any.
    pub fn attendance_of_user(
        &self,
        user_id: UserId,
        match_club_id: MatchClubId,
    ) -> Option<&Attendance> {
        self.attendances
            .values()
            .find(|a| a.match_club_id == match_club_id && a.user_id == Some(user_id))
    }

    /// Match date behind one attendance (attendance -> side -> match).
    pub fn match_date_of_attendance(&self, attendance_id: AttendanceId) -> Result<DateTime<Utc>> {
        let att = self.attendance(attendance_id)?;
        let side = self.match_club(att.match_club_id)?;
        Ok(self.match_row(side.match_id)?.scheduled_at)
    }

    /// A club's sides whose match date falls within `[start, end)`.
    pub fn club_sides_in_window(
        &self,
        club_id: ClubId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&MatchClub> {
        self.match_clubs
            .values()
            .filter(|mc| mc.club_id == club_id && mc.active)
            .filter(|mc| {
                self.matches
                    .get(&mc.match_id)
                    .map(|m| m.scheduled_at >= start && m.scheduled_at < end)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// A player's attendances whose match date falls within `[start, end)`.
    pub fn player_attendances_in_window(
        &self,
        player_id: PlayerId,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Vec<&Attendance> {
        self.attendances
            .values()
            .filter(|a| a.player_id == Some(player_id))
            .filter(|a| {
                self.match_clubs
                    .get(&a.match_club_id)
                    .and_then(|mc| self.matches.get(&mc.match_id))
                    .map(|m| m.scheduled_at >= start && m.scheduled_at < end)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Resolve the display identity behind an attendance.
    ///
    /// Player name wins over mercenary info; `None` when neither resolves.
    pub fn display_identity(&self, att: &Attendance) -> Option<DisplayIdentity> {
        if let Some(player_id) = att.player_id {
            if let Some(player) = self.players.get(&player_id) {
                return Some(DisplayIdentity {
                    name: player.name.clone(),
                    image_url: player.image_url.clone(),
                    member_type: MemberType::Player,
                });
            }
        }
        att.mercenary.as_ref().map(|info| DisplayIdentity {
            name: info.name.clone(),
            image_url: info.image_url.clone(),
            member_type: MemberType::Mercenary,
        })
    }

    // ---- upserts -------------------------------------------------------

    /// Insert or replace the evaluation for (rater, attendance).
    ///
    /// At most one row ever exists per key; the latest write wins.
    pub fn upsert_evaluation(&mut self, eval: Evaluation) {
        match self.evaluations.iter_mut().find(|e| {
            e.rater_user_id == eval.rater_user_id && e.attendance_id == eval.attendance_id
        }) {
            Some(existing) => *existing = eval,
            None => self.evaluations.push(eval),
        }
    }

    pub fn upsert_rating_stats(&mut self, stats: AttendanceRatingStats) {
        self.rating_stats.insert(stats.attendance_id, stats);
    }

    pub fn upsert_rating_vote(&mut self, vote: AttendanceRatingVote) {
        self.rating_votes.insert(vote.attendance_id, vote);
    }

    pub fn upsert_history(&mut self, row: PlayerStatsHistory) {
        match self.stats_history.iter_mut().find(|h| {
            h.player_id == row.player_id
                && h.period_type == row.period_type
                && h.period_key == row.period_key
        }) {
            Some(existing) => *existing = row,
            None => self.stats_history.push(row),
        }
    }

    pub fn history(
        &self,
        player_id: PlayerId,
        period_type: crate::models::PeriodType,
        period_key: &str,
    ) -> Option<&PlayerStatsHistory> {
        self.stats_history.iter().find(|h| {
            h.player_id == player_id
                && h.period_type == period_type
                && h.period_key == period_key
        })
    }
}
