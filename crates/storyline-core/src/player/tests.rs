use super::*;
use crate::{
    input::{InputEvent, Key, mock::QueuedInput},
    render::{Screen, SegmentFill},
    repository::{
        RepositoryReply, RepositoryRequest,
        mock::{MockLatency, MockStoryRepository},
    },
    story::{StorySequence, UserId},
};

type TestPlayer = StoryPlayer<MockStoryRepository, QueuedInput<16>>;

const VIEWER: UserId = UserId(1);
const S1: StoryId = StoryId(1);
const S2: StoryId = StoryId(2);
const S3: StoryId = StoryId(3);

fn sequence(ids: &[u32]) -> StorySequence {
    StorySequence::from_stories(ids.iter().map(|&id| {
        Story::new(
            StoryId(id),
            UserId(100 + id),
            "https://cdn.example/story.jpg",
            id as u64 * 1_000,
        )
        .unwrap()
    }))
    .unwrap()
}

fn player_for(ids: &[u32]) -> TestPlayer {
    let repository = MockStoryRepository::new(sequence(ids), 0);
    StoryPlayer::new(repository, QueuedInput::new(), PlayerConfig::default())
}

fn drain(player: &mut TestPlayer) -> Vec<PlayerEvent> {
    let mut events = Vec::new();
    while let Some(event) = player.poll_event() {
        events.push(event);
    }
    events
}

fn push_input(player: &mut TestPlayer, event: InputEvent) {
    player.with_input_mut(|input| input.push(event)).unwrap();
}

fn assert_progress(player: &TestPlayer, expected: f32) {
    let progress = player.progress_pct().unwrap();
    assert!(
        (progress - expected).abs() < 1e-3,
        "progress {progress} != {expected}"
    );
}

#[test]
fn open_resolves_target_position_exactly() {
    for len in 1..=5u32 {
        let ids: Vec<u32> = (1..=len).collect();
        for (position, &target) in ids.iter().enumerate() {
            let mut player = player_for(&ids);
            player
                .open(sequence(&ids), StoryId(target), VIEWER, 0)
                .unwrap();

            assert_eq!(player.state(), PlayerState::Playing);
            assert_eq!(player.current_index(), Some(position));
            assert_eq!(
                drain(&mut player).first(),
                Some(&PlayerEvent::CurrentStoryChanged {
                    index: position,
                    story: StoryId(target),
                })
            );
        }
    }
}

#[test]
fn unknown_target_starts_at_first_story() {
    let mut player = player_for(&[1, 2, 3]);
    assert_eq!(player.open(sequence(&[1, 2, 3]), StoryId(99), VIEWER, 0), Ok(()));
    assert_eq!(player.current_index(), Some(0));
    assert_eq!(player.current_story().map(|s| s.id), Some(S1));
}

#[test]
fn empty_sequence_reports_one_configuration_error_and_stays_idle() {
    let mut player = player_for(&[]);
    assert_eq!(
        player.open(StorySequence::new(), S1, VIEWER, 0),
        Err(PlayerError::EmptySequence)
    );

    assert_eq!(player.state(), PlayerState::Idle);
    assert!(player.session().is_none());
    assert_eq!(
        drain(&mut player),
        vec![PlayerEvent::ConfigurationError(PlayerError::EmptySequence)]
    );

    player.tick(10_000);
    assert!(drain(&mut player).is_empty());
    assert_eq!(player.repository().submitted_marks(), 0);
}

#[test]
fn progress_after_k_ticks_is_linear() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();

    let config = player.config();
    let step = 100.0 * config.tick_interval_ms as f32 / config.story_duration_ms as f32;
    for k in 0..50u64 {
        player.tick(k * 100);
        assert_progress(&player, (k as f32 * step).min(100.0));
        assert_eq!(player.current_index(), Some(0));
    }
}

#[test]
fn three_story_scenario_auto_advances_then_closes() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S2, VIEWER, 0).unwrap();
    assert_eq!(player.current_index(), Some(1));
    assert_eq!(
        drain(&mut player),
        vec![
            PlayerEvent::CurrentStoryChanged { index: 1, story: S2 },
            PlayerEvent::ViewerMarked { story: S2 },
        ]
    );

    assert_eq!(player.tick(4_900), TickResult::RenderRequested);
    assert_eq!(player.current_index(), Some(1));
    assert_progress(&player, 98.0);

    player.tick(5_000);
    assert_eq!(player.current_index(), Some(2));
    assert_progress(&player, 0.0);
    assert_eq!(
        drain(&mut player),
        vec![
            PlayerEvent::CurrentStoryChanged { index: 2, story: S3 },
            PlayerEvent::ViewerMarked { story: S3 },
        ]
    );

    player.tick(10_000);
    assert_eq!(player.state(), PlayerState::Closed);
    assert!(player.session().is_none());
    assert_eq!(
        drain(&mut player),
        vec![PlayerEvent::Closed {
            reason: CloseReason::Completed
        }]
    );
}

#[test]
fn single_story_advance_closes_and_ignores_everything_after() {
    let mut player = player_for(&[1]);
    player.open(sequence(&[1]), S1, VIEWER, 0).unwrap();
    drain(&mut player);

    player.advance(10);
    assert_eq!(player.state(), PlayerState::Closed);
    assert_eq!(
        drain(&mut player),
        vec![PlayerEvent::Closed {
            reason: CloseReason::Completed
        }]
    );

    player.advance(20);
    player.retreat(20);
    player.toggle_pause(20);
    player.close(20);
    player.report_media_failure(S1, 20);
    push_input(&mut player, InputEvent::Key(Key::ArrowRight));
    player.tick(60_000);

    assert_eq!(player.state(), PlayerState::Closed);
    assert!(drain(&mut player).is_empty());
}

#[test]
fn retreat_on_first_story_is_a_noop() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.tick(1_000);
    drain(&mut player);

    player.retreat(1_000);
    assert_eq!(player.state(), PlayerState::Playing);
    assert_eq!(player.current_index(), Some(0));
    assert_progress(&player, 20.0);
    assert!(drain(&mut player).is_empty());
}

#[test]
fn retreat_resets_progress_and_never_closes() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S3, VIEWER, 0).unwrap();
    player.tick(2_000);

    player.retreat(2_000);
    player.retreat(2_000);
    player.retreat(2_000);
    assert_eq!(player.state(), PlayerState::Playing);
    assert_eq!(player.current_index(), Some(0));
    assert_progress(&player, 0.0);
}

#[test]
fn pause_halts_accrual_and_resume_keeps_progress() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.tick(1_000);
    assert_progress(&player, 20.0);

    player.toggle_pause(1_000);
    assert_eq!(player.state(), PlayerState::Paused);
    player.tick(30_000);
    assert_progress(&player, 20.0);
    assert_eq!(player.current_index(), Some(0));

    player.toggle_pause(30_000);
    assert_eq!(player.state(), PlayerState::Playing);
    player.tick(30_050);
    assert_progress(&player, 20.0);
    player.tick(30_500);
    assert_progress(&player, 30.0);

    let pause_events: Vec<_> = drain(&mut player)
        .into_iter()
        .filter(|event| matches!(event, PlayerEvent::PauseChanged { .. }))
        .collect();
    assert_eq!(
        pause_events,
        vec![
            PlayerEvent::PauseChanged { paused: true },
            PlayerEvent::PauseChanged { paused: false },
        ]
    );
}

#[test]
fn manual_navigation_while_paused_stays_paused() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.tick(1_000);
    player.toggle_pause(1_000);

    player.advance(1_200);
    assert_eq!(player.state(), PlayerState::Paused);
    assert_eq!(player.current_index(), Some(1));
    assert!(player.session().is_some_and(|s| s.paused()));
    player.tick(20_000);
    assert_progress(&player, 0.0);
}

#[test]
fn mark_viewed_is_issued_once_per_story_despite_oscillation() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 0).unwrap();
    player.advance(10);
    player.retreat(20);
    player.advance(30);
    player.retreat(40);
    player.advance(50);

    assert_eq!(player.repository().submitted_marks(), 2);
    let marked: Vec<_> = drain(&mut player)
        .into_iter()
        .filter(|event| matches!(event, PlayerEvent::ViewerMarked { .. }))
        .collect();
    assert_eq!(
        marked,
        vec![
            PlayerEvent::ViewerMarked { story: S1 },
            PlayerEvent::ViewerMarked { story: S2 },
        ]
    );

    player.tick(1_000);
    let repository = player.repository();
    assert_eq!(repository.record(S1).unwrap().viewers(), &[VIEWER]);
    assert_eq!(repository.record(S2).unwrap().viewers(), &[VIEWER]);
    assert!(repository.record(S3).unwrap().viewers().is_empty());
}

#[test]
fn viewer_is_applied_locally_before_the_repository_answers() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();

    assert!(player.current_story().unwrap().has_viewer(VIEWER));
    assert!(player.repository().record(S1).unwrap().viewers().is_empty());

    player.tick(200);
    assert_eq!(player.view_stats().acknowledged, 1);
    assert!(player.repository().record(S1).unwrap().has_viewer(VIEWER));
}

#[test]
fn media_failure_behaves_like_finished_timer() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.tick(700);
    drain(&mut player);

    player.report_media_failure(S1, 700);
    assert_eq!(player.current_index(), Some(1));
    assert_progress(&player, 0.0);
    assert_eq!(
        drain(&mut player),
        vec![
            PlayerEvent::MediaSkipped { story: S1 },
            PlayerEvent::CurrentStoryChanged { index: 1, story: S2 },
            PlayerEvent::ViewerMarked { story: S2 },
        ]
    );

    player.report_media_failure(S2, 800);
    assert_eq!(player.state(), PlayerState::Closed);
    assert_eq!(
        drain(&mut player).last(),
        Some(&PlayerEvent::Closed {
            reason: CloseReason::Completed
        })
    );
}

#[test]
fn media_failure_for_a_story_that_is_no_longer_current_is_ignored() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 0).unwrap();
    player.advance(100);
    drain(&mut player);

    player.report_media_failure(S1, 150);
    assert_eq!(player.current_index(), Some(1));
    assert!(drain(&mut player).is_empty());
}

#[test]
fn close_stops_clock_detaches_input_once_and_discards_late_replies() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.tick(50);
    player.close(50);

    assert_eq!(player.state(), PlayerState::Closed);
    assert_eq!(player.input_detach_count(), 1);
    player.close(60);
    assert_eq!(player.input_detach_count(), 1);

    // Mark-viewed reply for S1 lands at 200, after the session is gone.
    player.tick(300);
    let stats = player.view_stats();
    assert_eq!(stats.issued, 1);
    assert_eq!(stats.stale, 1);
    assert_eq!(stats.acknowledged, 0);
    // The repository still accepted it.
    assert!(player.repository().record(S1).unwrap().has_viewer(VIEWER));

    let closes = drain(&mut player)
        .into_iter()
        .filter(|event| matches!(event, PlayerEvent::Closed { .. }))
        .count();
    assert_eq!(closes, 1);
}

#[test]
fn reply_after_story_changed_is_stale() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.advance(100);

    player.tick(250);
    let stats = player.view_stats();
    assert_eq!(stats.stale, 1);
    assert_eq!(stats.acknowledged, 0);

    player.tick(300);
    assert_eq!(player.view_stats().acknowledged, 1);
}

#[test]
fn keyboard_and_taps_drive_the_player() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 0).unwrap();

    push_input(&mut player, InputEvent::Key(Key::ArrowRight));
    player.tick(10);
    assert_eq!(player.current_index(), Some(1));

    push_input(&mut player, InputEvent::Tap { x: 10, width: 300 });
    player.tick(20);
    assert_eq!(player.current_index(), Some(0));

    push_input(&mut player, InputEvent::Tap { x: 250, width: 300 });
    push_input(&mut player, InputEvent::Key(Key::Space));
    player.tick(30);
    assert_eq!(player.current_index(), Some(1));
    assert_eq!(player.state(), PlayerState::Paused);

    push_input(&mut player, InputEvent::PauseControl);
    player.tick(40);
    assert_eq!(player.state(), PlayerState::Playing);

    push_input(&mut player, InputEvent::BackdropClick);
    player.tick(50);
    assert_eq!(player.state(), PlayerState::Closed);
}

#[test]
fn input_queued_behind_escape_never_reaches_a_later_session() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 0).unwrap();

    push_input(&mut player, InputEvent::Key(Key::Escape));
    push_input(&mut player, InputEvent::Key(Key::ArrowRight));
    push_input(&mut player, InputEvent::Key(Key::ArrowRight));
    player.tick(10);
    assert_eq!(player.state(), PlayerState::Closed);
    assert!(player.with_input_mut(|input| input.is_empty()));

    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 20).unwrap();
    player.tick(30);
    assert_eq!(player.current_index(), Some(0));
}

#[test]
fn input_after_close_is_ignored() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.close(10);
    drain(&mut player);

    push_input(&mut player, InputEvent::Key(Key::ArrowRight));
    push_input(&mut player, InputEvent::Key(Key::Space));
    player.tick(20);
    assert_eq!(player.state(), PlayerState::Closed);
    assert!(drain(&mut player).is_empty());
}

#[test]
fn reopen_starts_a_fresh_session() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 0).unwrap();
    player.advance(100);
    player.tick(2_000);
    let first_session = player.session().map(|s| s.id());
    player.close(2_000);

    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 3_000).unwrap();
    assert_ne!(player.session().map(|s| s.id()), first_session);
    assert_eq!(player.current_index(), Some(0));
    assert_progress(&player, 0.0);
    // S1 was marked again for the new session.
    assert_eq!(player.repository().submitted_marks(), 3);
}

#[test]
fn open_while_playing_replaces_the_session() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 0).unwrap();
    drain(&mut player);

    player.open(sequence(&[1, 2, 3]), S3, VIEWER, 500).unwrap();
    assert_eq!(player.current_index(), Some(2));
    assert_eq!(player.input_detach_count(), 1);
    assert_eq!(
        drain(&mut player).first(),
        Some(&PlayerEvent::Closed {
            reason: CloseReason::Replaced
        })
    );
}

#[test]
fn failed_mark_is_swallowed() {
    let mut player = player_for(&[1, 2]);
    player.with_repository_mut(|repository| repository.fail_mark_viewed(S1));
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();

    player.tick(200);
    assert_eq!(player.view_stats().failed, 1);
    assert_eq!(player.state(), PlayerState::Playing);
    assert!(player.current_story().unwrap().has_viewer(VIEWER));

    player.tick(5_000);
    assert_eq!(player.current_index(), Some(1));
}

#[test]
fn refused_submission_does_not_block_playback() {
    let mut player = player_for(&[1, 2]);
    player.with_repository_mut(|repository| repository.set_unavailable(true));
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();

    assert_eq!(player.view_stats().failed, 1);
    assert_eq!(player.view_stats().issued, 0);
    assert!(
        drain(&mut player).contains(&PlayerEvent::ViewerMarked { story: S1 })
    );
    player.tick(5_000);
    assert_eq!(player.current_index(), Some(1));
}

#[test]
fn no_tick_is_delivered_before_open() {
    let mut player = player_for(&[1, 2]);
    assert_eq!(player.tick(60_000), TickResult::NoRender);

    player.open(sequence(&[1, 2]), S1, VIEWER, 60_000).unwrap();
    player.tick(60_050);
    assert_progress(&player, 0.0);
    player.tick(60_100);
    assert_progress(&player, 2.0);
}

#[test]
fn screen_reflects_session() {
    let mut player = player_for(&[1, 2, 3]);
    assert!(player.with_screen(|screen| screen == Screen::Hidden));

    player.open(sequence(&[1, 2, 3]), S2, VIEWER, 0).unwrap();
    player.tick(2_500);

    player.with_screen(|screen| {
        let Screen::Story(story) = screen else {
            panic!("expected story screen");
        };
        assert_eq!(story.counter(), (2, 3));
        assert_eq!(story.header.story_id, S2);
        assert!(!story.paused);
        let segments: Vec<_> = story.segments().collect();
        assert_eq!(
            segments,
            vec![
                SegmentFill::Complete,
                SegmentFill::Partial(50),
                SegmentFill::Empty,
            ]
        );
    });
}

#[test]
fn custom_timing_drives_auto_advance() {
    let repository = MockStoryRepository::new(sequence(&[1, 2]), 0).with_latency(MockLatency::uniform(0));
    let config = PlayerConfig::default()
        .with_story_duration_ms(1_000)
        .with_tick_interval_ms(250);
    let mut player: TestPlayer = StoryPlayer::new(repository, QueuedInput::new(), config);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();

    player.tick(750);
    assert_progress(&player, 75.0);
    player.tick(1_000);
    assert_eq!(player.current_index(), Some(1));
    assert_eq!(player.view_stats().acknowledged, 1);
}

#[test]
fn manual_advance_gives_the_next_story_a_full_first_tick() {
    let mut player = player_for(&[1, 2]);
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.tick(150);
    assert_progress(&player, 2.0);

    player.advance(190);
    player.tick(200);
    assert_progress(&player, 0.0);
    player.tick(289);
    assert_progress(&player, 0.0);
    player.tick(290);
    assert_progress(&player, 2.0);
}

#[test]
fn stalled_host_moves_at_most_one_story_per_tick_call() {
    let mut player = player_for(&[1, 2, 3]);
    player.open(sequence(&[1, 2, 3]), S1, VIEWER, 0).unwrap();
    player.tick(0);
    drain(&mut player);

    player.tick(15_000);
    assert_eq!(player.state(), PlayerState::Playing);
    assert_eq!(player.current_index(), Some(1));
    assert_progress(&player, 0.0);
    assert_eq!(
        drain(&mut player),
        vec![
            PlayerEvent::CurrentStoryChanged { index: 1, story: S2 },
            PlayerEvent::ViewerMarked { story: S2 },
        ]
    );
    assert_eq!(player.repository().submitted_marks(), 2);

    // S2 still gets its whole duration, counted from the catch-up call.
    player.tick(19_900);
    assert_eq!(player.current_index(), Some(1));
    player.tick(20_000);
    assert_eq!(player.current_index(), Some(2));
}

#[test]
fn failed_reply_after_story_changed_counts_as_failure() {
    let mut player = player_for(&[1, 2]);
    player.with_repository_mut(|repository| repository.fail_mark_viewed(S1));
    player.open(sequence(&[1, 2]), S1, VIEWER, 0).unwrap();
    player.advance(100);

    player.tick(250);
    let stats = player.view_stats();
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.stale, 0);
    assert_eq!(player.current_index(), Some(1));
}

#[test]
fn screen_header_carries_the_joined_author() {
    let mut repository = MockStoryRepository::demo(1_000_000)
        .unwrap()
        .with_latency(MockLatency::uniform(0));
    repository.submit(RepositoryRequest::FetchAll, 0).unwrap();
    let Some((_, Ok(RepositoryReply::Stories(feed)))) = repository.poll_reply(0) else {
        panic!("expected the feed");
    };

    let mut player: TestPlayer =
        StoryPlayer::new(repository, QueuedInput::new(), PlayerConfig::default());
    player.open(feed, StoryId(3), VIEWER, 0).unwrap();
    player.with_screen(|screen| {
        let Screen::Story(story) = screen else {
            panic!("expected story screen");
        };
        assert_eq!(story.header.author_id, UserId(4));
        assert_eq!(story.header.author_name(), Some("Amara Okafor"));
        assert_eq!(
            story.header.author_avatar_url(),
            Some("https://i.pravatar.cc/150?u=4")
        );
    });
}
