//! Grow Island セーブ/ロード機能。
//!
//! キャラクター選択と最後のシミュレーション入力だけを localStorage に保存する。
//! 描画サーフェスの状態（適用済みベースライン、天気レイヤー等）は保存しない。
//!
//! ## バージョニング方針
//!
//! - `SAVE_VERSION`: 現在のセーブ形式バージョン。フィールド追加時にインクリメントする。
//! - `MIN_COMPATIBLE_VERSION`: 互換性を維持できる最小バージョン。
//!   既存フィールドの意味変更や削除など破壊的変更を行った場合のみインクリメントする。

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::state::{Sector, SimulationInputs};

/// セーブデータのフォーマットバージョン。
const SAVE_VERSION: u32 = 1;

/// 互換性を維持できる最小バージョン。
const MIN_COMPATIBLE_VERSION: u32 = 1;

/// localStorage のキー。
#[cfg(target_arch = "wasm32")]
const STORAGE_KEY: &str = "grow_island_save";

#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save data is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("save version {found} is older than the minimum supported {min}")]
    Incompatible { found: u32, min: u32 },
    #[error("localStorage is unavailable")]
    StorageUnavailable,
}

#[derive(Serialize, Deserialize)]
struct SaveData {
    version: u32,
    island: IslandSave,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(default)]
struct IslandSave {
    /// None = キャラクター未選択（初回）。
    character: Option<u8>,
    special: bool,
    profit_percent: f64,
    /// Sector::key() の文字列。不明な値は default に戻す。
    sector: String,
    experience: i32,
}

fn extract_save(inputs: &SimulationInputs) -> SaveData {
    SaveData {
        version: SAVE_VERSION,
        island: IslandSave {
            character: inputs.character,
            special: inputs.special,
            profit_percent: inputs.profit_percent,
            sector: inputs.sector.key().to_string(),
            experience: inputs.experience,
        },
    }
}

/// セーブデータを入力に復元する。範囲外の値はセッター経由でクランプされる。
fn apply_save(inputs: &mut SimulationInputs, save: &IslandSave) {
    inputs.character = save.character;
    inputs.special = save.special;
    inputs.set_profit(save.profit_percent);
    inputs.sector = Sector::from_key(&save.sector);
    inputs.set_experience(save.experience);
}

pub fn to_json(inputs: &SimulationInputs) -> Result<String, SaveError> {
    Ok(serde_json::to_string(&extract_save(inputs))?)
}

/// JSON を検証して入力に復元する。失敗時は `inputs` を変更しない。
pub fn from_json(json: &str, inputs: &mut SimulationInputs) -> Result<(), SaveError> {
    let data: SaveData = serde_json::from_str(json)?;
    if data.version < MIN_COMPATIBLE_VERSION {
        return Err(SaveError::Incompatible {
            found: data.version,
            min: MIN_COMPATIBLE_VERSION,
        });
    }
    apply_save(inputs, &data.island);
    Ok(())
}

/// localStorage にアクセスする。WASM 環境でのみ動作。
#[cfg(target_arch = "wasm32")]
fn get_storage() -> Result<web_sys::Storage, SaveError> {
    web_sys::window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .ok_or(SaveError::StorageUnavailable)
}

/// 入力を localStorage に保存する。
#[cfg(target_arch = "wasm32")]
pub fn save(inputs: &SimulationInputs) -> Result<(), SaveError> {
    let json = to_json(inputs)?;
    get_storage()?
        .set_item(STORAGE_KEY, &json)
        .map_err(|_| SaveError::StorageUnavailable)
}

/// localStorage から復元する。セーブが無ければ `Ok(false)`。
#[cfg(target_arch = "wasm32")]
pub fn load(inputs: &mut SimulationInputs) -> Result<bool, SaveError> {
    let storage = get_storage()?;
    let Some(json) = storage.get_item(STORAGE_KEY).ok().flatten() else {
        return Ok(false);
    };
    from_json(&json, inputs)?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> SimulationInputs {
        SimulationInputs {
            profit_percent: -12.5,
            sector: Sector::Energy,
            experience: 64,
            character: Some(1),
            special: true,
        }
    }

    #[test]
    fn extract_and_apply_roundtrip() {
        let json = to_json(&sample()).expect("serialize");
        let mut restored = SimulationInputs::new();
        from_json(&json, &mut restored).expect("load");
        assert_eq!(restored, sample());
    }

    #[test]
    fn unselected_character_stays_unselected() {
        let json = to_json(&SimulationInputs::new()).expect("serialize");
        assert!(json.contains("\"character\":null"));
        let mut restored = sample();
        from_json(&json, &mut restored).expect("load");
        assert_eq!(restored.character, None);
    }

    #[test]
    fn version_below_min_compatible_is_rejected() {
        let json = r#"{"version":0,"island":{"profit_percent":3.0}}"#;
        let mut inputs = sample();
        let err = from_json(json, &mut inputs).unwrap_err();
        assert!(matches!(err, SaveError::Incompatible { found: 0, min: 1 }));
        assert_eq!(inputs, sample());
    }

    #[test]
    fn unknown_fields_in_json_are_ignored() {
        let json = r#"{"version":1,"island":{"sector":"bio","experience":30,"goal":15.0},"chat":[]}"#;
        let mut inputs = SimulationInputs::new();
        from_json(json, &mut inputs).expect("load");
        assert_eq!(inputs.sector, Sector::Bio);
        assert_eq!(inputs.experience, 30);
    }

    #[test]
    fn missing_fields_use_defaults() {
        let json = r#"{"version":1,"island":{}}"#;
        let mut inputs = sample();
        from_json(json, &mut inputs).expect("load");
        assert_eq!(inputs.sector, Sector::Default);
        assert_eq!(inputs.character, None);
        assert_eq!(inputs.profit_percent, 0.0);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let json = r#"{"version":1,"island":{"profit_percent":99.9,"experience":-4,"sector":"moon"}}"#;
        let mut inputs = SimulationInputs::new();
        from_json(json, &mut inputs).expect("load");
        assert_eq!(inputs.profit_percent, 50.0);
        assert_eq!(inputs.experience, 0);
        assert_eq!(inputs.sector, Sector::Default);
    }

    #[test]
    fn garbage_is_a_json_error() {
        let mut inputs = sample();
        let err = from_json("not json", &mut inputs).unwrap_err();
        assert!(matches!(err, SaveError::Json(_)));
        assert_eq!(inputs, sample());
    }

    #[test]
    fn newer_version_still_loads() {
        let json = r#"{"version":7,"island":{"experience":90}}"#;
        let mut inputs = SimulationInputs::new();
        from_json(json, &mut inputs).expect("load");
        assert_eq!(inputs.experience, 90);
    }
}
