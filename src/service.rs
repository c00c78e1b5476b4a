//! Game orchestration
//!
//! This module wires the stores, the channel publisher, and the pure
//! game logic into the operations a transport layer exposes: game
//! creation, the player lifecycle, answer checking and scoring, the
//! final password gate, results, and the host controls. Requests are
//! handled statelessly; the only cross-request contracts are the
//! store's conditional updates.

use enum_map::EnumMap;
use garde::Validate;
use serde::{Deserialize, Serialize};
use web_time::SystemTime;

use crate::{
    branch::{self, Clue, CreateGame},
    channel::{AreaRef, ChannelPublisher, ChatData, ChatExtra, Envelope, EventName, LobbyData, Topic},
    constants::branch::SPARE_SAMPLE_SETS,
    error::{Error, Result},
    game::{FinalPuzzle, Game, GameResults, HostView, PathList, PuzzleView, TeamRoster, Winner},
    game_id::GameId,
    player::{Player, PlayerId, clean_name},
    puzzle::{Difficulty, NewPuzzle, Puzzle, PuzzleId, catalog},
    store::{GameStore, PlayerStore, PuzzleStore},
};

const GAME_MISSING: &str = "This game does not exist!";
const GAME_ENDED: &str = "This game has ended";
const GAME_STARTED: &str = "This game has already started";
const HOST_AUTH_FAILED: &str = "No such game and password exists";
const PLAYER_MISSING: &str = "This player does not exist!";
const PUZZLE_MISSING: &str = "No such puzzle";
const INVALID_PUZZLE: &str = "Invalid puzzle";
const TEAM_MISSING: &str = "No such team";
const NAME_TAKEN: &str = "This player name already exists";

/// Outcome of an answer submission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerResult {
    /// Whether the submitted answer matched
    pub correct: bool,
    /// Whether the puzzle's slot carries a clue, the shape clue included
    pub has_clue: bool,
}

/// Outcome of a password attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordResult {
    /// Whether the password matched and the game is over
    pub success: bool,
}

/// A single path puzzle as served to a player
#[derive(Debug, Clone, PartialEq)]
pub enum SinglePath {
    /// A teammate already solved this puzzle
    Solved,
    /// The puzzle is open, served without its secrets
    Open(Box<PuzzleView>),
}

/// The game engine behind the transport layer
///
/// Generic over the storage backend and the channel publisher so tests
/// and deployments can swap either without touching the game logic.
pub struct GameService<S, C> {
    store: S,
    channel: C,
}

impl<S, C> GameService<S, C>
where
    S: GameStore + PlayerStore + PuzzleStore,
    C: ChannelPublisher,
{
    /// Creates a service on top of a storage backend and a publisher
    pub fn new(store: S, channel: C) -> Self {
        Self { store, channel }
    }

    /// Fetches a game that must still be running
    ///
    /// Ended games reject every operation except the results, so this
    /// gate fronts all the others.
    fn live_game(&self, game_id: GameId) -> Result<Game> {
        let game = self
            .store
            .game(game_id)?
            .ok_or_else(|| Error::NotFound(GAME_MISSING.to_owned()))?;
        if game.has_ended() {
            return Err(Error::InvalidState(GAME_ENDED.to_owned()));
        }
        Ok(game)
    }

    /// Fetches a game with the host credential checked
    fn admin_game(&self, game_id: GameId, admin_password: &str) -> Result<Game> {
        self.store
            .game_by_admin(game_id, admin_password)?
            .ok_or_else(|| Error::NotFound(HOST_AUTH_FAILED.to_owned()))
    }

    /// Fetches one player of a game
    fn required_player(&self, game_id: GameId, player_id: PlayerId) -> Result<Player> {
        self.store
            .player(game_id, player_id)?
            .ok_or_else(|| Error::NotFound(PLAYER_MISSING.to_owned()))
    }

    fn require_team(game: &Game, team: &str) -> Result<()> {
        if game.teams.iter().any(|known| known == team) {
            Ok(())
        } else {
            Err(Error::Validation(TEAM_MISSING.to_owned()))
        }
    }

    /// Builds and persists a new game from a host's settings
    ///
    /// Samples each enabled tier's puzzle pool with one spare path's
    /// worth of slack, builds every team's paths, and stores the game
    /// under a fresh join code.
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the settings fail validation or a
    /// tier's puzzle pool is too small to fill every team's path.
    pub fn create_game(&self, request: CreateGame) -> Result<GameId> {
        request.validate()?;
        let CreateGame {
            password,
            admin_password,
            branches,
            teams,
        } = request;

        let mut pools = EnumMap::<Difficulty, Vec<Puzzle>>::default();
        for (difficulty, config) in &branches {
            if !config.enabled {
                continue;
            }
            let want = (teams.len() + SPARE_SAMPLE_SETS) * config.max_path;
            pools[difficulty] = self.store.sample(difficulty, want)?;
        }
        let built = branch::build(&teams, &branches, pools)?;

        let game = Game {
            game_id: GameId::new(),
            password,
            admin_password,
            teams,
            branches: built,
            start_at: None,
            end_at: None,
            winner: None,
        };
        self.store.insert_game(&game)?;
        Ok(game.game_id)
    }

    /// Checks that a game exists and still accepts players
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown join code and
    /// `Error::InvalidState` once the game has ended.
    pub fn verify_game(&self, game_id: GameId) -> Result<()> {
        self.live_game(game_id).map(|_| ())
    }

    /// Adds a player to a game under a validated display name
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for an unusable name,
    /// `Error::Conflict` when the name is already taken in this game
    /// (ignoring case), and the usual game gates.
    pub fn join(&self, game_id: GameId, name: &str) -> Result<Player> {
        self.live_game(game_id)?;
        let name = clean_name(name)?;
        if self.store.player_by_name(game_id, &name)?.is_some() {
            return Err(Error::Conflict(NAME_TAKEN.to_owned()));
        }
        let player = Player::new(game_id, name);
        self.store.insert_player(&player)?;
        Ok(player)
    }

    /// Puts a player on a team and announces it on the lobby feed
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a team the game does not have
    /// and `Error::NotFound` for an unknown player.
    pub fn set_team(&self, game_id: GameId, player_id: PlayerId, team: &str) -> Result<Player> {
        let game = self.live_game(game_id)?;
        Self::require_team(&game, team)?;
        let mut player = self.required_player(game_id, player_id)?;
        self.store.set_team(game_id, player_id, team)?;
        player.team = Some(team.to_owned());
        self.channel.publish(
            &Topic::Lobby(game_id),
            &Envelope::new(
                EventName::JoinedTeam,
                &LobbyData {
                    display: format!("{} has joined the {team} team!", player.name),
                    player: Some(player.name.clone()),
                    team: Some(team.to_owned()),
                    id: None,
                },
            ),
        );
        Ok(player)
    }

    /// Removes a player at their own request
    ///
    /// # Returns
    ///
    /// `false` if the player was not in the game; nothing is announced
    /// in that case.
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend fails.
    pub fn leave(&self, game_id: GameId, player_id: PlayerId) -> Result<bool> {
        let Some(player) = self.store.player(game_id, player_id)? else {
            return Ok(false);
        };
        if !self.store.remove_player(game_id, player_id)? {
            return Ok(false);
        }
        self.channel.publish(
            &Topic::Lobby(game_id),
            &Envelope::new(
                EventName::LeaveRoom,
                &LobbyData {
                    display: format!("{} has left the lobby", player.name),
                    player: Some(player.name),
                    team: None,
                    id: None,
                },
            ),
        );
        Ok(true)
    }

    /// Lists each team's players for the lobby screen
    ///
    /// # Errors
    ///
    /// Returns the usual game gates.
    pub fn lobby(&self, game_id: GameId) -> Result<Vec<TeamRoster>> {
        let game = self.live_game(game_id)?;
        let players = self.store.players(game_id)?;
        Ok(game.lobby(&players))
    }

    /// Serves one team's answer-free path listing
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a team the game does not have,
    /// plus the usual game gates.
    pub fn paths(&self, game_id: GameId, team: &str) -> Result<PathList> {
        let game = self.live_game(game_id)?;
        game.path_list(team)
            .ok_or_else(|| Error::Validation(TEAM_MISSING.to_owned()))
    }

    /// Serves a single path puzzle, looked up across every team
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when no path carries the puzzle, plus
    /// the usual game gates.
    pub fn single_path(&self, game_id: GameId, puzzle_id: &PuzzleId) -> Result<SinglePath> {
        let game = self.live_game(game_id)?;
        let Some((_, _, _, entry)) = game.find_puzzle_anywhere(puzzle_id) else {
            return Err(Error::NotFound(PUZZLE_MISSING.to_owned()));
        };
        Ok(if entry.solved {
            SinglePath::Solved
        } else {
            SinglePath::Open(Box::new(PuzzleView::from(entry)))
        })
    }

    /// Checks an answer against a puzzle on the submitting team's path
    ///
    /// Only the first correct submission scores: the solved transition
    /// goes through the store's conditional update, and the winning
    /// writer gets the points for the tier and announces a non-sentinel
    /// clue on the team chat. Repeats still report `correct`.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the team's paths do not carry the
    /// puzzle, plus the usual game gates.
    pub fn check_answer(
        &self,
        game_id: GameId,
        team: &str,
        player_id: PlayerId,
        puzzle_id: &PuzzleId,
        answer: &str,
    ) -> Result<AnswerResult> {
        let game = self.live_game(game_id)?;
        Self::require_team(&game, team)?;
        let player = self.required_player(game_id, player_id)?;
        let Some((difficulty, position, entry)) = game.find_puzzle(team, puzzle_id) else {
            return Err(Error::NotFound(PUZZLE_MISSING.to_owned()));
        };

        let correct = entry.answer.to_uppercase() == answer.to_uppercase();
        let has_clue = entry.clue.is_some();
        if correct && self.store.mark_solved(game_id, team, difficulty, position)? {
            self.store
                .add_score(game_id, player_id, difficulty.points())?;
            if let Some(Clue::Word(word)) = &entry.clue {
                self.channel.publish(
                    &Topic::TeamChat(game_id, team.to_owned()),
                    &Envelope::new(
                        EventName::GetClue,
                        &ChatData {
                            author: None,
                            text: format!(
                                "{} has discovered a new clue: {word}",
                                player.name
                            ),
                            id: player.name.clone(),
                            extra: Some(ChatExtra { clue: word.clone() }),
                            area: AreaRef::path(position),
                        },
                    ),
                );
            }
        }
        Ok(AnswerResult { correct, has_clue })
    }

    /// Checks an answer against a repository puzzle directly
    ///
    /// The repository-side twin of [`check_answer`](Self::check_answer):
    /// the puzzle is resolved by identifier alone, its entry is located
    /// across every team's paths, the solved-once contract still holds,
    /// and the points follow the repository puzzle's own difficulty.
    /// Nothing is announced since there is no team context.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the puzzle or the game does not
    /// exist.
    pub fn check_puzzle(
        &self,
        puzzle_id: &PuzzleId,
        game_id: GameId,
        player_id: PlayerId,
        answer: &str,
    ) -> Result<AnswerResult> {
        let puzzle = self
            .store
            .puzzle(puzzle_id)?
            .ok_or_else(|| Error::NotFound(INVALID_PUZZLE.to_owned()))?;
        let game = self
            .store
            .game(game_id)?
            .ok_or_else(|| Error::NotFound(INVALID_PUZZLE.to_owned()))?;

        let correct = puzzle.answer.to_uppercase() == answer.to_uppercase();
        let mut has_clue = false;
        if correct {
            if let Some((team, difficulty, position, entry)) =
                game.find_puzzle_anywhere(puzzle_id)
            {
                has_clue = entry.clue.is_some();
                if self.store.mark_solved(game_id, team, difficulty, position)? {
                    self.store
                        .add_score(game_id, player_id, puzzle.difficulty.points())?;
                }
            }
        }
        Ok(AnswerResult { correct, has_clue })
    }

    /// Serves one team's final gate
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` for a team the game does not have,
    /// plus the usual game gates.
    pub fn final_puzzle(&self, game_id: GameId, team: &str) -> Result<FinalPuzzle> {
        let game = self.live_game(game_id)?;
        game.final_puzzle(team)
            .ok_or_else(|| Error::Validation(TEAM_MISSING.to_owned()))
    }

    /// Checks a password attempt at the final gate
    ///
    /// A correct password decides the winner from the current scores,
    /// stamps the outcome once, and announces the win on every team's
    /// chat. A wrong one only bounces off, announced on the submitter's
    /// team chat.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidState` when a concurrent attempt ended the
    /// game first, plus the usual game gates.
    pub fn check_password(
        &self,
        game_id: GameId,
        team: &str,
        player_id: PlayerId,
        password: &str,
    ) -> Result<PasswordResult> {
        let game = self.live_game(game_id)?;
        Self::require_team(&game, team)?;
        let player = self.required_player(game_id, player_id)?;

        let success = game.password.to_uppercase() == password.to_uppercase();
        if success {
            let players = self.store.players(game_id)?;
            let winner = game.decide_winner(&players);
            if !self.store.set_ended(game_id, &winner, SystemTime::now())? {
                return Err(Error::InvalidState(GAME_ENDED.to_owned()));
            }
            let data = ChatData {
                author: None,
                text: format!(
                    "{} has opened the door and ended the game! \
                     Transferring you to the results page in 10 seconds...",
                    player.name
                ),
                id: player.name.clone(),
                extra: None,
                area: AreaRef::final_gate(),
            };
            for team in &game.teams {
                self.channel.publish(
                    &Topic::TeamChat(game_id, team.clone()),
                    &Envelope::new(EventName::SuccessPassword, &data),
                );
            }
        } else {
            self.channel.publish(
                &Topic::TeamChat(game_id, team.to_owned()),
                &Envelope::new(
                    EventName::FailPassword,
                    &ChatData {
                        author: None,
                        text: format!(
                            "{} has entered the incorrect password and is repelled by \
                             the door! Will there be any other brave soul who can \
                             crack the password?",
                            player.name
                        ),
                        id: player.name.clone(),
                        extra: None,
                        area: AreaRef::final_gate(),
                    },
                ),
            );
        }
        Ok(PasswordResult { success })
    }

    /// Serves the results summary
    ///
    /// The one operation an ended game still answers; it also works
    /// mid-game, with the winner absent.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` for an unknown game.
    pub fn results(&self, game_id: GameId) -> Result<GameResults> {
        let game = self
            .store
            .game(game_id)?
            .ok_or_else(|| Error::NotFound(GAME_MISSING.to_owned()))?;
        let players = self.store.players(game_id)?;
        Ok(game.results(&players))
    }

    /// Starts a game and announces it on the lobby feed
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the credential does not match and
    /// `Error::InvalidState` when the game has already started.
    pub fn start_game(&self, game_id: GameId, admin_password: &str) -> Result<()> {
        self.admin_game(game_id, admin_password)?;
        if !self.store.set_started(game_id, SystemTime::now())? {
            return Err(Error::InvalidState(GAME_STARTED.to_owned()));
        }
        self.channel.publish(
            &Topic::Lobby(game_id),
            &Envelope::new(
                EventName::GameStart,
                &LobbyData {
                    display: "Game has started!".to_owned(),
                    ..LobbyData::default()
                },
            ),
        );
        Ok(())
    }

    /// Ends a game on the host's behalf
    ///
    /// Decides the winner exactly like a successful password attempt
    /// and announces the end on every team's chat, attributed to the
    /// host.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the credential does not match and
    /// `Error::InvalidState` when the game has already ended.
    pub fn end_game(&self, game_id: GameId, admin_password: &str) -> Result<Winner> {
        let game = self.admin_game(game_id, admin_password)?;
        let players = self.store.players(game_id)?;
        let winner = game.decide_winner(&players);
        if !self.store.set_ended(game_id, &winner, SystemTime::now())? {
            return Err(Error::InvalidState(GAME_ENDED.to_owned()));
        }
        let data = ChatData {
            author: None,
            text: "The game has been ended by the host. \
                   Transferring you to the results page in 10 seconds..."
                .to_owned(),
            id: "Game Host".to_owned(),
            extra: None,
            area: AreaRef::final_gate(),
        };
        for team in &game.teams {
            self.channel.publish(
                &Topic::TeamChat(game_id, team.clone()),
                &Envelope::new(EventName::SuccessPassword, &data),
            );
        }
        Ok(winner)
    }

    /// Removes a player on the host's behalf
    ///
    /// # Returns
    ///
    /// `false` if the player was not in the game; nothing is announced
    /// in that case.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the credential does not match.
    pub fn remove_player(
        &self,
        game_id: GameId,
        admin_password: &str,
        player_id: PlayerId,
    ) -> Result<bool> {
        self.admin_game(game_id, admin_password)?;
        let Some(player) = self.store.player(game_id, player_id)? else {
            return Ok(false);
        };
        if !self.store.remove_player(game_id, player_id)? {
            return Ok(false);
        }
        self.channel.publish(
            &Topic::Lobby(game_id),
            &Envelope::new(
                EventName::LeaveRoom,
                &LobbyData {
                    display: format!("{} has left the lobby", player.name),
                    player: Some(player.name.clone()),
                    team: None,
                    id: Some(player.player_id.to_string()),
                },
            ),
        );
        Ok(true)
    }

    /// Serves the host dashboard for the game's current phase
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` when the credential does not match.
    pub fn host_view(&self, game_id: GameId, admin_password: &str) -> Result<HostView> {
        let game = self.admin_game(game_id, admin_password)?;
        let players = self.store.players(game_id)?;
        Ok(game.host_view(&players))
    }

    /// Adds a puzzle to the repository, refreshing a matching one
    ///
    /// # Errors
    ///
    /// Returns `Error::Validation` if the payload fails validation.
    pub fn add_puzzle(&self, puzzle: NewPuzzle) -> Result<Puzzle> {
        puzzle.validate()?;
        Ok(self.store.upsert_puzzle(puzzle)?)
    }

    /// Seeds the repository with the starter catalog
    ///
    /// # Errors
    ///
    /// Returns a store error if the backend fails.
    pub fn seed_starter_puzzles(&self) -> Result<Vec<Puzzle>> {
        catalog::starter_puzzles()
            .into_iter()
            .map(|puzzle| Ok(self.store.upsert_puzzle(puzzle)?))
            .collect()
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::{branch::BranchConfig, puzzle::PuzzleKind, store::MemoryStore};

    #[derive(Default)]
    struct RecordingChannel {
        published: Mutex<Vec<(String, Envelope)>>,
    }

    impl RecordingChannel {
        fn events(&self, name: EventName) -> Vec<(String, Envelope)> {
            self.published
                .lock()
                .unwrap()
                .iter()
                .filter(|(_, envelope)| envelope.name == name)
                .cloned()
                .collect()
        }
    }

    impl ChannelPublisher for RecordingChannel {
        fn publish(&self, topic: &Topic, envelope: &Envelope) {
            self.published
                .lock()
                .unwrap()
                .push((topic.to_string(), envelope.clone()));
        }
    }

    type TestService<'a> = GameService<MemoryStore, &'a RecordingChannel>;

    fn seed_easy_puzzles(service: &TestService, answers: &[&str]) {
        for answer in answers {
            service
                .add_puzzle(NewPuzzle {
                    answer: (*answer).to_owned(),
                    hint: "Bird".to_owned(),
                    difficulty: Difficulty::Easy,
                    kind: PuzzleKind::Blanks,
                    long_text: None,
                    image: None,
                })
                .unwrap();
        }
    }

    fn easy_game(clues: &[&str], max_path: usize) -> CreateGame {
        let mut branches = EnumMap::<Difficulty, BranchConfig>::default();
        branches[Difficulty::Easy] = BranchConfig {
            enabled: true,
            clues: clues.iter().map(|clue| (*clue).to_owned()).collect(),
            min_path: 1,
            max_path,
        };
        CreateGame {
            password: "Night Owl".to_owned(),
            admin_password: "hunter2".to_owned(),
            branches,
            teams: vec!["red".to_owned(), "blue".to_owned()],
        }
    }

    /// Positional answers for one team, read off the host answer sheet.
    fn red_answers(service: &TestService, game_id: GameId, count: usize) -> Vec<String> {
        let HostView::Paths { answer_list, .. } =
            service.host_view(game_id, "hunter2").unwrap()
        else {
            panic!("expected the paths view");
        };
        (0..count)
            .map(|position| answer_list["red"][&format!("pathway-easy-{}", position + 1)].answer.clone())
            .collect()
    }

    #[test]
    fn test_create_game_needs_a_full_pool() {
        let recorder = RecordingChannel::default();
        let service = TestService::new(MemoryStore::new(), &recorder);

        assert!(matches!(
            service.create_game(easy_game(&[], 3)),
            Err(Error::Validation(_))
        ));

        service.seed_starter_puzzles().unwrap();
        let game_id = service.create_game(easy_game(&[], 3)).unwrap();
        service.verify_game(game_id).unwrap();
        assert!(matches!(
            service.verify_game(GameId::new()),
            Err(Error::NotFound(_))
        ));

        let lobby = service.lobby(game_id).unwrap();
        assert_eq!(lobby.len(), 2);
        assert!(lobby.iter().all(|roster| roster.players.is_empty()));
    }

    #[test]
    fn test_join_enforces_name_rules() {
        let recorder = RecordingChannel::default();
        let service = TestService::new(MemoryStore::new(), &recorder);
        service.seed_starter_puzzles().unwrap();
        let game_id = service.create_game(easy_game(&[], 1)).unwrap();

        assert!(matches!(
            service.join(GameId::new(), "Wren"),
            Err(Error::NotFound(_))
        ));

        let player = service.join(game_id, "  Wren ").unwrap();
        assert_eq!(player.name, "Wren");
        assert!(player.team.is_none());

        assert!(matches!(
            service.join(game_id, "wren"),
            Err(Error::Conflict(_))
        ));
        assert!(matches!(service.join(game_id, "  "), Err(Error::Validation(_))));
        assert!(matches!(
            service.join(game_id, "shit"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_team_changes_are_validated_and_announced() {
        let recorder = RecordingChannel::default();
        let service = TestService::new(MemoryStore::new(), &recorder);
        service.seed_starter_puzzles().unwrap();
        let game_id = service.create_game(easy_game(&[], 1)).unwrap();
        let player = service.join(game_id, "Wren").unwrap();

        assert!(matches!(
            service.set_team(game_id, player.player_id, "green"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            service.set_team(game_id, PlayerId::new(), "red"),
            Err(Error::NotFound(_))
        ));

        let updated = service.set_team(game_id, player.player_id, "red").unwrap();
        assert_eq!(updated.team.as_deref(), Some("red"));

        let joined = recorder.events(EventName::JoinedTeam);
        assert_eq!(joined.len(), 1);
        assert_eq!(joined[0].0, format!("lobby-{game_id}"));
        assert_eq!(
            joined[0].1.data["display"],
            "Wren has joined the red team!"
        );

        let lobby = service.lobby(game_id).unwrap();
        assert_eq!(lobby[0].players, vec!["Wren".to_owned()]);

        assert!(service.leave(game_id, player.player_id).unwrap());
        assert!(!service.leave(game_id, player.player_id).unwrap());
        let left = recorder.events(EventName::LeaveRoom);
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].1.data["display"], "Wren has left the lobby");
    }

    #[test]
    fn test_answers_score_once_and_unlock_the_gate() {
        let recorder = RecordingChannel::default();
        let service = TestService::new(MemoryStore::new(), &recorder);
        seed_easy_puzzles(
            &service,
            &["Crow", "Wren", "Lark", "Dove", "Hawk", "Teal", "Swan", "Ibis"],
        );
        let game_id = service.create_game(easy_game(&["sparrow"], 2)).unwrap();
        let player = service.join(game_id, "Ada").unwrap();
        service.set_team(game_id, player.player_id, "red").unwrap();
        service.start_game(game_id, "hunter2").unwrap();

        let paths = service.paths(game_id, "red").unwrap();
        let entries = &paths.branch_return[&Difficulty::Easy];
        assert_eq!(entries.len(), 2);
        let answers = red_answers(&service, game_id, 2);

        let wrong = service
            .check_answer(game_id, "red", player.player_id, &entries[0].puzzle_id, "nope")
            .unwrap();
        assert!(!wrong.correct);

        let first = service
            .check_answer(
                game_id,
                "red",
                player.player_id,
                &entries[0].puzzle_id,
                &answers[0].to_lowercase(),
            )
            .unwrap();
        assert!(first.correct);
        assert!(first.has_clue);

        let repeat = service
            .check_answer(
                game_id,
                "red",
                player.player_id,
                &entries[0].puzzle_id,
                &answers[0],
            )
            .unwrap();
        assert!(repeat.correct);
        assert!(matches!(
            service.single_path(game_id, &entries[0].puzzle_id).unwrap(),
            SinglePath::Solved
        ));

        let second = service
            .check_answer(
                game_id,
                "red",
                player.player_id,
                &entries[1].puzzle_id,
                &answers[1],
            )
            .unwrap();
        assert!(second.correct);

        // one easy point per puzzle, the repeat did not double-score
        let results = service.results(game_id).unwrap();
        assert_eq!(results.teams[0].players[0].score, 2);

        // of the two slots, one carried the clue word and one the shape
        // sentinel, so exactly one clue announcement went out
        let clues = recorder.events(EventName::GetClue);
        assert_eq!(clues.len(), 1);
        assert_eq!(clues[0].0, format!("chat-{game_id}-red"));
        assert_eq!(clues[0].1.data["extra"]["clue"], "sparrow");

        let gate = service.final_puzzle(game_id, "red").unwrap();
        assert_eq!(gate.display, "_____ ___");
        assert_eq!(gate.clues, vec!["sparrow".to_owned()]);

        // the rival team earned nothing from red's progress
        let blue_gate = service.final_puzzle(game_id, "blue").unwrap();
        assert_eq!(blue_gate.display, "?");
        assert!(blue_gate.clues.is_empty());
    }

    #[test]
    fn test_unknown_puzzles_and_teams_are_rejected() {
        let recorder = RecordingChannel::default();
        let service = TestService::new(MemoryStore::new(), &recorder);
        service.seed_starter_puzzles().unwrap();
        let game_id = service.create_game(easy_game(&[], 1)).unwrap();
        let player = service.join(game_id, "Ada").unwrap();

        assert!(matches!(
            service.check_answer(game_id, "red", player.player_id, &PuzzleId::new(), "x"),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.check_answer(game_id, "green", player.player_id, &PuzzleId::new(), "x"),
            Err(Error::Validation(_))
        ));
        assert!(matches!(
            service.single_path(game_id, &PuzzleId::new()),
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.paths(game_id, "green"),
            Err(Error::Validation(_))
        ));
    }

    #[test]
    fn test_standalone_checker_scores_by_repository_difficulty() {
        let recorder = RecordingChannel::default();
        let service = TestService::new(MemoryStore::new(), &recorder);
        seed_easy_puzzles(&service, &["Crow", "Wren", "Lark"]);
        let game_id = service.create_game(easy_game(&["sparrow"], 1)).unwrap();
        let player = service.join(game_id, "Ada").unwrap();
        service.set_team(game_id, player.player_id, "red").unwrap();
        service.start_game(game_id, "hunter2").unwrap();

        let paths = service.paths(game_id, "red").unwrap();
        let puzzle_id = paths.branch_return[&Difficulty::Easy][0].puzzle_id.clone();
        let answer = red_answers(&service, game_id, 1).remove(0);

        assert!(matches!(
            service.check_puzzle(&PuzzleId::new(), game_id, player.player_id, "x"),
            Err(Error::NotFound(_))
        ));

        let miss = service
            .check_puzzle(&puzzle_id, game_id, player.player_id, "nope")
            .unwrap();
        assert!(!miss.correct);
        assert!(!miss.has_clue);

        let hit = service
            .check_puzzle(&puzzle_id, game_id, player.player_id, &answer)
            .unwrap();
        assert!(hit.correct);
        assert!(hit.has_clue);

        let again = service
            .check_puzzle(&puzzle_id, game_id, player.player_id, &answer)
            .unwrap();
        assert!(again.correct);

        let results = service.results(game_id).unwrap();
        assert_eq!(results.teams[0].players[0].score, 1);
        assert!(recorder.events(EventName::GetClue).is_empty());
    }

    #[test]
    fn test_password_gate_ends_the_game_for_everyone() {
        let recorder = RecordingChannel::default();
        let service = TestService::new(MemoryStore::new(), &recorder);
        seed_easy_puzzles(&service, &["Crow", "Wren", "Lark"]);
        let game_id = service.create_game(easy_game(&[], 1)).unwrap();
        let ada = service.join(game_id, "Ada").unwrap();
        let grace = service.join(game_id, "Grace").unwrap();
        service.set_team(game_id, ada.player_id, "red").unwrap();
        service.set_team(game_id, grace.player_id, "blue").unwrap();
        service.start_game(game_id, "hunter2").unwrap();

        let puzzle_id = service.paths(game_id, "red").unwrap().branch_return
            [&Difficulty::Easy][0]
            .puzzle_id
            .clone();
        let answer = red_answers(&service, game_id, 1).remove(0);
        service
            .check_answer(game_id, "red", ada.player_id, &puzzle_id, &answer)
            .unwrap();

        let bounced = service
            .check_password(game_id, "blue", grace.player_id, "wrong")
            .unwrap();
        assert!(!bounced.success);
        let failures = recorder.events(EventName::FailPassword);
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].0, format!("chat-{game_id}-blue"));

        let opened = service
            .check_password(game_id, "red", ada.player_id, "night OWL")
            .unwrap();
        assert!(opened.success);
        let wins = recorder.events(EventName::SuccessPassword);
        assert_eq!(wins.len(), 2);
        assert_eq!(wins[0].1.data["area"]["name"], "final");

        let results = service.results(game_id).unwrap();
        assert_eq!(results.winner, Some(Winner::Team("red".to_owned())));

        // an ended game answers nothing but the results
        assert!(matches!(
            service.paths(game_id, "red"),
            Err(Error::InvalidState(_))
        ));
        assert!(matches!(
            service.check_password(game_id, "red", ada.player_id, "night OWL"),
            Err(Error::InvalidState(_))
        ));
    }

    #[test]
    fn test_host_controls_the_game_lifecycle() {
        let recorder = RecordingChannel::default();
        let service = TestService::new(MemoryStore::new(), &recorder);
        service.seed_starter_puzzles().unwrap();
        let game_id = service.create_game(easy_game(&[], 1)).unwrap();
        let player = service.join(game_id, "Ada").unwrap();

        assert!(matches!(
            service.host_view(game_id, "wrong"),
            Err(Error::NotFound(_))
        ));

        let HostView::Lobby { list } = service.host_view(game_id, "hunter2").unwrap() else {
            panic!("expected the lobby view");
        };
        assert_eq!(list.last().unwrap().team, "noteam");
        assert_eq!(list.last().unwrap().players[0].name, "Ada");

        service.start_game(game_id, "hunter2").unwrap();
        assert!(matches!(
            service.start_game(game_id, "hunter2"),
            Err(Error::InvalidState(_))
        ));
        let starts = recorder.events(EventName::GameStart);
        assert_eq!(starts.len(), 1);
        assert_eq!(starts[0].1.data["display"], "Game has started!");

        assert!(service
            .remove_player(game_id, "hunter2", player.player_id)
            .unwrap());
        assert!(!service
            .remove_player(game_id, "hunter2", player.player_id)
            .unwrap());
        let removals = recorder.events(EventName::LeaveRoom);
        assert_eq!(removals.len(), 1);
        assert_eq!(removals[0].1.data["id"], player.player_id.to_string());

        let winner = service.end_game(game_id, "hunter2").unwrap();
        assert_eq!(winner, Winner::Tie);
        assert!(matches!(
            service.end_game(game_id, "hunter2"),
            Err(Error::InvalidState(_))
        ));
        assert_eq!(recorder.events(EventName::SuccessPassword).len(), 2);

        let view = service.host_view(game_id, "hunter2").unwrap();
        assert!(matches!(view, HostView::Results { winner: Some(Winner::Tie), .. }));
    }
}
