//! Decoded repo-sync job parameters.

use serde::{Deserialize, Serialize};

use crate::channel::Channel;

/// Boolean job flags. Absent keys leave a flag `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncFlags {
    pub no_errata: bool,
    pub latest: bool,
    pub sync_kickstart: bool,
    pub fail: bool,
}

/// One of the [`SyncFlags`], named by its payload key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncFlag {
    NoErrata,
    Latest,
    SyncKickstart,
    Fail,
}

impl SyncFlag {
    pub const ALL: [SyncFlag; 4] = [
        SyncFlag::NoErrata,
        SyncFlag::Latest,
        SyncFlag::SyncKickstart,
        SyncFlag::Fail,
    ];

    /// Key spelling used in payloads.
    pub fn key(self) -> &'static str {
        match self {
            SyncFlag::NoErrata => "no-errata",
            SyncFlag::Latest => "latest",
            SyncFlag::SyncKickstart => "sync-kickstart",
            SyncFlag::Fail => "fail",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|flag| flag.key() == key)
    }
}

impl SyncFlags {
    pub fn get(&self, flag: SyncFlag) -> bool {
        match flag {
            SyncFlag::NoErrata => self.no_errata,
            SyncFlag::Latest => self.latest,
            SyncFlag::SyncKickstart => self.sync_kickstart,
            SyncFlag::Fail => self.fail,
        }
    }

    pub fn set(&mut self, flag: SyncFlag, value: bool) {
        let slot = match flag {
            SyncFlag::NoErrata => &mut self.no_errata,
            SyncFlag::Latest => &mut self.latest,
            SyncFlag::SyncKickstart => &mut self.sync_kickstart,
            SyncFlag::Fail => &mut self.fail,
        };
        *slot = value;
    }
}

/// Channels (in payload order) plus job flags.
///
/// Serializes as
/// `{"channels": [{"channel_id", "channel_label"}], "no_errata", "latest", "sync_kickstart", "fail"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepoSyncDetails {
    pub channels: Vec<Channel>,
    #[serde(flatten)]
    pub flags: SyncFlags,
}

impl RepoSyncDetails {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "channels": self.channels,
            "no_errata": self.flags.no_errata,
            "latest": self.flags.latest,
            "sync_kickstart": self.flags.sync_kickstart,
            "fail": self.flags.fail,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_keys_round_trip() {
        for flag in SyncFlag::ALL {
            assert_eq!(SyncFlag::from_key(flag.key()), Some(flag));
        }
        assert_eq!(SyncFlag::from_key("no_errata"), None);
        assert_eq!(SyncFlag::from_key("Latest"), None);
    }

    #[test]
    fn set_touches_one_flag() {
        let mut flags = SyncFlags::default();
        flags.set(SyncFlag::SyncKickstart, true);
        assert!(flags.get(SyncFlag::SyncKickstart));
        assert_eq!(
            flags,
            SyncFlags {
                sync_kickstart: true,
                ..SyncFlags::default()
            }
        );
    }

    #[test]
    fn serializes_flat() {
        let details = RepoSyncDetails {
            channels: vec![Channel::new(123, "centos7-x86_64")],
            flags: SyncFlags {
                latest: true,
                ..SyncFlags::default()
            },
        };
        let expected = serde_json::json!({
            "channels": [{"channel_id": 123, "channel_label": "centos7-x86_64"}],
            "no_errata": false,
            "latest": true,
            "sync_kickstart": false,
            "fail": false,
        });
        assert_eq!(serde_json::to_value(&details).unwrap(), expected);
        assert_eq!(details.to_json(), expected);
        let back: RepoSyncDetails = serde_json::from_value(expected).unwrap();
        assert_eq!(back, details);
    }
}
