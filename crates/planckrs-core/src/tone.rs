// Planckrs Tone Sink
// Fire-and-forget audio feedback collaborator

use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};

use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// Note sequences the firmware knows how to play
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Song {
    Startup,
    Qwerty,
    Dvorak,
    Colemak,
    Plover,
    PloverGoodbye,
    MusicScale,
    Goodbye,
}

/// Audio collaborator. Implementations must return without waiting for
/// playback.
pub trait ToneSink {
    /// Queue a song
    fn play(&mut self, song: Song);

    /// Silence anything still playing
    fn stop_all(&mut self) {}
}

/// Sink for boards without a speaker
#[derive(Debug, Clone, Copy, Default)]
pub struct NoTone;

impl ToneSink for NoTone {
    fn play(&mut self, song: Song) {
        log::trace!("no speaker, dropping song {}", song);
    }
}

/// Sink that hands songs to a player thread over a bounded channel.
///
/// A full queue drops the song instead of blocking the caller.
#[derive(Debug, Clone)]
pub struct ChannelTone {
    sender: SyncSender<ToneCommand>,
}

/// Messages delivered to the player side of a [`ChannelTone`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToneCommand {
    Play(Song),
    StopAll,
}

impl ChannelTone {
    /// Create a sink and the receiver the player drains
    pub fn new(depth: usize) -> (Self, Receiver<ToneCommand>) {
        let (sender, receiver) = sync_channel(depth.max(1));
        (Self { sender }, receiver)
    }

    fn send(&self, command: ToneCommand) {
        match self.sender.try_send(command) {
            Ok(()) => {}
            Err(TrySendError::Full(command)) => {
                log::warn!("tone queue full, dropping {:?}", command);
            }
            Err(TrySendError::Disconnected(command)) => {
                log::debug!("tone player gone, dropping {:?}", command);
            }
        }
    }
}

impl ToneSink for ChannelTone {
    fn play(&mut self, song: Song) {
        self.send(ToneCommand::Play(song));
    }

    fn stop_all(&mut self) {
        self.send(ToneCommand::StopAll);
    }
}

impl<T: ToneSink + ?Sized> ToneSink for Box<T> {
    fn play(&mut self, song: Song) {
        (**self).play(song);
    }

    fn stop_all(&mut self) {
        (**self).stop_all();
    }
}

impl<T: ToneSink + ?Sized> ToneSink for &mut T {
    fn play(&mut self, song: Song) {
        (**self).play(song);
    }

    fn stop_all(&mut self) {
        (**self).stop_all();
    }
}
