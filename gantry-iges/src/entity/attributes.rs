//! Attribute entities: color definition (314).

use super::{Entity, EntityCore, SeqMap};
use crate::errors::Result;
use crate::record::{Param, ParamRecord};
use std::any::Any;

/// Entity 314: an RGB color, each channel in percent of full intensity,
/// with an optional name. The channels live in one canonical array; the
/// named accessors replace the original's union aliases.
#[derive(Debug, Default)]
pub struct ColorDefinition {
    core: EntityCore,
    channels: [f64; 3],
    name: Option<String>,
}

impl ColorDefinition {
    /// type code of the entity
    pub const TYPE_CODE: u32 = 314;

    /// Creates a black color definition.
    pub fn new() -> ColorDefinition {
        ColorDefinition {
            core: EntityCore::new(Self::TYPE_CODE),
            channels: [0.0; 3],
            name: None,
        }
    }

    /// Creates a color from channel percentages, clamped to `0 ..= 100`.
    pub fn from_rgb(red: f64, green: f64, blue: f64) -> ColorDefinition {
        let clamp = |v: f64| v.clamp(0.0, 100.0);
        ColorDefinition {
            core: EntityCore::new(Self::TYPE_CODE),
            channels: [clamp(red), clamp(green), clamp(blue)],
            name: None,
        }
    }

    /// red percentage
    pub fn red(&self) -> f64 { self.channels[0] }
    /// green percentage
    pub fn green(&self) -> f64 { self.channels[1] }
    /// blue percentage
    pub fn blue(&self) -> f64 { self.channels[2] }
    /// optional color name
    pub fn name(&self) -> Option<&str> { self.name.as_deref() }
}

impl Entity for ColorDefinition {
    fn core(&self) -> &EntityCore { &self.core }
    fn core_mut(&mut self) -> &mut EntityCore { &mut self.core }
    fn type_code(&self) -> u32 { Self::TYPE_CODE }

    fn read_pd(&mut self, pd: &ParamRecord) -> Result<()> {
        for (i, c) in self.channels.iter_mut().enumerate() {
            *c = pd.real(i)?;
        }
        self.name = pd.string(3).map(str::to_string);
        Ok(())
    }

    fn format(&self, _xref: &SeqMap) -> Result<ParamRecord> {
        let mut pd = ParamRecord::new(Self::TYPE_CODE);
        pd.params = self.channels.iter().map(|&c| Param::Real(c)).collect();
        if let Some(name) = &self.name {
            pd.params.push(Param::Str(name.clone()));
        }
        Ok(pd)
    }

    fn as_any(&self) -> &dyn Any { self }
    fn as_any_mut(&mut self) -> &mut dyn Any { self }
}
