//! Well-known key names
//!
//! [`SettingKey`] names are persisted inside the central settings blob, so
//! their string forms are part of the on-disk format and must not change.
//! [`MemoryKey`] names live only in the process-wide memory cache.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

macro_rules! key_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $text:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            /// Every key, in declaration order
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            /// Stable string form
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $name::ALL
                    .iter()
                    .copied()
                    .find(|key| key.as_str() == s)
                    .ok_or_else(|| Error::UnknownKey(s.to_string()))
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }
    };
}

key_enum! {
    /// Persisted settings stored in the central cache
    SettingKey {
        AdvertisingTrackingStatus => "tiercache.settings.advertising_tracking_status",
        Bitmask => "tiercache.settings.bitmask",
        DataProcessingOptions => "tiercache.settings.data_processing_options",
        DataSourceId => "tiercache.gateway.data_source_id",
        Domain => "tiercache.gateway.domain",
        InternalUserData => "tiercache.settings.user_data.internal",
        IsAdvertiserIdCollectionEnabled => "tiercache.settings.advertiser_id_collection_enabled",
        IsAutoLogAppEventsEnabled => "tiercache.settings.auto_log_app_events_enabled",
        IsServerAdvertiserIdCollectionEnabled => "tiercache.settings.server_advertiser_id_collection_enabled",
        LimitEventAndDataUsage => "tiercache.settings.limit_event_and_data_usage",
        UserData => "tiercache.settings.user_data",
        AppEventsConfiguration => "tiercache.default.app_events_configuration",
        AppEventsConfigNextFetchTime => "tiercache.default.app_events_configuration_fetch_time",
        LastSuspendDate => "tiercache.default.last_suspend_date",
        AppLinkParams => "tiercache.default.app_link_params",
        EndpointBackoffTime => "tiercache.default.backoff_time",
        EndpointBackoffRetryCount => "tiercache.default.backoff_retry_count",
        FeatureManagerFeature => "tiercache.default.feature_manager.feature",
        LastAttributionPing => "tiercache.default.last_attribution_ping",
        AppInstallTimestamp => "tiercache.default.app_install_timestamp",
        UnsentCrashReports => "tiercache.default.unsent_crash_reports",
        CachedSdkVersion => "tiercache.default.cached_sdk_version",
        DisabledFeaturesTimestamps => "tiercache.default.disabled_features_timestamps",
        TraceId => "tiercache.default.trace_id",
        NewCandidateDate => "tiercache.iap.new_candidate_date",
        RestoredTransactionCheckDate => "tiercache.iap.restored_transaction_check_date",
    }
}

key_enum! {
    /// Ephemeral values kept in the shared memory cache only
    MemoryKey {
        ExtInfoLastCheckTime => "tiercache.extinfo.last_check_time",
        ExtInfoLastEncodedInfo => "tiercache.extinfo.last_encoded_info",
        PreviousCpuSample => "tiercache.sysctrl.previous_cpu_sample",
        IsFirstMinidumpProcess => "tiercache.minidump.is_first_process",
        HasAttributionReporterStarted => "tiercache.attribution.reporter_started",
        CurrentDeviceInfo => "tiercache.device.current_info",
    }
}

// =============================================================================
// Tests
// =============================================================================
