//! Periodic structure of a mirror: blocks of layers repeated in place.

use serde::{Deserialize, Serialize};

use crate::error::{MirrorError, Result};
use crate::layer::Layer;

#[cfg(test)]
mod tests {

    use super::*;
    use crate::matrix::C64;
    use crate::permittivity::EpsType;

    const STACK: &str = r#"
        [[blocks]]
        [[blocks.layers]]
        type = "gaas"
        d = 100.0
        eps_type = "gauss_adachi"

        [[blocks]]
        repeat = 20
        [[blocks.layers]]
        type = "algaas"
        d = 60.0
        k = 0.0
        x = 0.3
        eps_type = "adachi"
        [[blocks.layers]]
        type = "const_refractive_index"
        d = 70.5
        n = [3.1, 0.01]
    "#;

    #[test]
    fn parses_toml_description() {
        let structure: Structure = toml::from_str(STACK).unwrap();
        assert_eq!(structure.blocks.len(), 2);
        assert_eq!(structure.blocks[0].repeat, 1);
        assert_eq!(structure.blocks[1].repeat, 20);
        assert_eq!(
            structure.blocks[1].layers[1],
            Layer::ConstRefractiveIndex {
                d: 70.5,
                n: C64::new(3.1, 0.01)
            }
        );
        assert_eq!(
            structure.blocks[0].layers[0],
            Layer::GaAs {
                d: 100.0,
                eps_type: EpsType::GaussAdachi
            }
        );
        assert_eq!(structure.layer_count(), 3);
        assert!(structure.validate().is_ok());
    }

    #[test]
    fn rejects_degenerate_structures() {
        assert_eq!(Structure::default().validate(), Err(MirrorError::EmptyStructure));

        let layer = Layer::ConstRefractiveIndex {
            d: 50.0,
            n: C64::new(1.5, 0.0),
        };
        let structure = Structure::new(vec![Block::new(1, vec![layer.clone()]), Block::new(2, vec![])]);
        assert_eq!(structure.validate(), Err(MirrorError::EmptyBlock(1)));

        let structure = Structure::new(vec![Block::new(0, vec![layer])]);
        assert_eq!(
            structure.validate(),
            Err(MirrorError::InvalidRepeat { index: 0, repeat: 0 })
        );
    }

    #[test]
    fn semi_infinite_layers_stay_outside() {
        let slab = Layer::ConstRefractiveIndex {
            d: 50.0,
            n: C64::new(1.5, 0.0),
        };
        let structure = Structure::new(vec![
            Block::new(1, vec![slab.clone()]),
            Block::new(3, vec![slab, Layer::medium(C64::new(1.0, 0.0))]),
        ]);
        assert_eq!(
            structure.validate(),
            Err(MirrorError::InfiniteThickness { block: 1, layer: 1 })
        );
    }

    #[test]
    fn first_layer() {
        let structure: Structure = toml::from_str(STACK).unwrap();
        assert_eq!(structure.first_layer().map(|l| l.name()), Some("GaAs"));
        assert!(Structure::default().first_layer().is_none());
    }
}

fn one() -> usize {
    1
}

/// One period of layers, repeated `repeat` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default = "one")]
    pub repeat: usize,
    #[serde(default)]
    pub layers: Vec<Layer>,
}

impl Block {
    pub fn new(repeat: usize, layers: Vec<Layer>) -> Self {
        Self { repeat, layers }
    }
}

/// The stack between the two bounding media, in the direction of propagation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Structure {
    #[serde(default)]
    pub blocks: Vec<Block>,
}

impl Structure {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    /// Number of layers written in the description, not counting repeats.
    pub fn layer_count(&self) -> usize {
        self.blocks.iter().map(|block| block.layers.len()).sum()
    }

    pub fn first_layer(&self) -> Option<&Layer> {
        self.blocks.iter().flat_map(|block| block.layers.iter()).next()
    }

    pub fn validate(&self) -> Result<()> {
        if self.blocks.is_empty() {
            return Err(MirrorError::EmptyStructure);
        }
        for (index, block) in self.blocks.iter().enumerate() {
            if block.layers.is_empty() {
                return Err(MirrorError::EmptyBlock(index));
            }
            if block.repeat == 0 || u32::try_from(block.repeat).is_err() {
                return Err(MirrorError::InvalidRepeat {
                    index,
                    repeat: block.repeat,
                });
            }
            for (position, layer) in block.layers.iter().enumerate() {
                if layer.d().is_infinite() {
                    return Err(MirrorError::InfiniteThickness {
                        block: index,
                        layer: position,
                    });
                }
                layer.validate()?;
            }
        }
        Ok(())
    }
}
