use std::path::Path;

use ethers::abi::Token;
use ethers::types::{Address, U256};
use eyre::WrapErr;
use indicatif::ProgressStyle;
use serde::Deserialize;
use tracing::{info, info_span, instrument, Instrument, Span};
use tracing_indicatif::span_ext::IndicatifSpanExt;

use super::MULTI_VESTING_CONTRACT_ADDRESS;
use crate::config::{ConfigError, EnvReader};
use crate::contracts;
use crate::deployment::DeploymentContext;
use crate::report::contract_deployment::TransactionRecord;
use crate::serde_utils;
use crate::types::{AmountUnit, UnixTimestamp, SECONDS_PER_DAY};

/// One entry of the schedule file, as written by hand.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VestingScheduleEntry {
    pub beneficiary: Address,
    #[serde(rename = "vestingStartTimeISO", with = "serde_utils::iso_timestamp")]
    pub vesting_start: UnixTimestamp,
    pub vesting_duration_days: u64,
    #[serde(rename = "cliffEndTimeISO", with = "serde_utils::iso_timestamp")]
    pub cliff_end: UnixTimestamp,
    #[serde(deserialize_with = "serde_utils::string_or_integer::deserialize")]
    pub amount: String,
}

/// A schedule ready to be passed to `createVestingWallet`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VestingSchedule {
    pub beneficiary: Address,
    pub start: UnixTimestamp,
    /// Seconds
    pub duration: u64,
    pub cliff_end: UnixTimestamp,
    /// Smallest units
    pub amount: U256,
}

impl VestingSchedule {
    pub fn from_entry(
        entry: &VestingScheduleEntry,
        unit: AmountUnit,
    ) -> eyre::Result<Self> {
        let duration = entry
            .vesting_duration_days
            .checked_mul(SECONDS_PER_DAY)
            .ok_or_else(|| {
                eyre::eyre!("vesting duration of {} days overflows", entry.vesting_duration_days)
            })?;

        Ok(Self {
            beneficiary: entry.beneficiary,
            start: entry.vesting_start,
            duration,
            cliff_end: entry.cliff_end,
            amount: unit.to_smallest_unit(&entry.amount)?,
        })
    }

    pub fn tokens(&self) -> Vec<Token> {
        vec![
            Token::Address(self.beneficiary),
            Token::Uint(self.start.0.into()),
            Token::Uint(self.duration.into()),
            Token::Uint(self.cliff_end.0.into()),
            Token::Uint(self.amount),
        ]
    }
}

/// Parses every entry of a JSON schedule list. Fails on the first bad one.
pub fn parse_schedules(content: &str, unit: AmountUnit) -> eyre::Result<Vec<VestingSchedule>> {
    let entries: Vec<VestingScheduleEntry> =
        serde_json::from_str(content).wrap_err("Parsing vesting schedules")?;

    entries
        .iter()
        .enumerate()
        .map(|(index, entry)| {
            VestingSchedule::from_entry(entry, unit)
                .wrap_err_with(|| format!("Vesting schedule #{index} ({:?})", entry.beneficiary))
        })
        .collect()
}

pub async fn read_schedules(
    path: impl AsRef<Path>,
    unit: AmountUnit,
) -> eyre::Result<Vec<VestingSchedule>> {
    let path = path.as_ref();

    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Reading from {}", path.display()))?;

    parse_schedules(&content, unit).with_context(|| format!("In {}", path.display()))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VestingWalletsParams {
    pub multi_vesting: Address,
    pub schedules: Vec<VestingSchedule>,
}

impl VestingWalletsParams {
    pub fn new(
        env: &EnvReader,
        schedules: Vec<VestingSchedule>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            multi_vesting: env.address(MULTI_VESTING_CONTRACT_ADDRESS)?,
            schedules,
        })
    }
}

/// Creates one vesting wallet per schedule, strictly one after another.
#[instrument(skip_all, fields(count = params.schedules.len()))]
pub async fn run(
    context: &DeploymentContext,
    params: &VestingWalletsParams,
) -> eyre::Result<Vec<TransactionRecord>> {
    let span = Span::current();
    span.pb_set_style(&ProgressStyle::with_template(
        "{span_child_prefix}{spinner} creating vesting wallets {pos}/{len}",
    )?);
    span.pb_set_length(params.schedules.len() as u64);

    let spec = contracts::multi_vesting_wallet();
    let mut records = Vec::with_capacity(params.schedules.len());

    for (index, schedule) in params.schedules.iter().enumerate() {
        let entry_span = info_span!(
            "vesting_wallet",
            index,
            beneficiary = ?schedule.beneficiary
        );

        let record = async {
            let call = super::bind(
                context,
                &spec,
                params.multi_vesting,
                "createVestingWallet",
                schedule.tokens(),
            )
            .await?;

            super::submit(context, &call).await
        }
        .instrument(entry_span)
        .await
        .wrap_err_with(|| {
            format!("Creating vesting wallet #{index} for {:?}", schedule.beneficiary)
        })?;

        info!(
            index,
            beneficiary = ?schedule.beneficiary,
            tx_hash = ?record.transaction_hash,
            "Vesting wallet created"
        );

        span.pb_inc(1);
        records.push(record);
    }

    Ok(records)
}
