use log::{info, warn};
use shuttle_core::{Profile, Version};
use thiserror::Error;

use crate::{v1, v2, v3};

/// A loaded archive of any generation.
pub enum Fmu {
    V1(v1::Archive),
    V2(v2::Archive),
    V3(v3::Archive),
}

/// Errors that can occur while binding an archive to an execution mode.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectError {
    #[error("FMI {version} archive does not support {mode}")]
    Unsupported {
        version: Version,
        mode: &'static str,
    },
}

impl Fmu {
    #[must_use]
    pub fn version(&self) -> Version {
        match self {
            Self::V1(_) => Version::V1,
            Self::V2(_) => Version::V2,
            Self::V3(_) => Version::V3,
        }
    }

    /// Binds the archive to one execution mode.
    ///
    /// Generation 1 archives provide exactly one mode, so `force_model_exchange`
    /// is ignored for them. Later generations prefer co-simulation and fall
    /// back to model exchange; with `force_model_exchange` set they must
    /// provide model exchange.
    ///
    /// # Errors
    ///
    /// Returns [`SelectError::Unsupported`] if the requested mode is missing.
    pub fn select(
        self,
        instance_name: &str,
        force_model_exchange: bool,
    ) -> Result<Profile, SelectError> {
        let version = self.version();
        let profile = match self {
            Self::V1(archive) => {
                if force_model_exchange {
                    warn!("FMI 1.0 archives declare a single mode; ignoring the model-exchange flag");
                }
                match archive {
                    v1::Archive::Model(raw) => {
                        Profile::ModelExchange(Box::new(v1::ModelAdapter::new(raw, instance_name)))
                    }
                    v1::Archive::Slave(raw) => {
                        Profile::CoSimulation(Box::new(v1::SlaveAdapter::new(raw, instance_name)))
                    }
                }
            }
            Self::V2(v2::Archive {
                model_exchange,
                co_simulation,
            }) => match pick(model_exchange, co_simulation, force_model_exchange, version)? {
                Picked::ModelExchange(raw) => Profile::ModelExchange(Box::new(
                    v2::ModelExchangeAdapter::new(raw, instance_name),
                )),
                Picked::CoSimulation(raw) => Profile::CoSimulation(Box::new(
                    v2::CoSimulationAdapter::new(raw, instance_name),
                )),
            },
            Self::V3(v3::Archive {
                model_exchange,
                co_simulation,
            }) => match pick(model_exchange, co_simulation, force_model_exchange, version)? {
                Picked::ModelExchange(raw) => Profile::ModelExchange(Box::new(
                    v3::ModelExchangeAdapter::new(raw, instance_name),
                )),
                Picked::CoSimulation(raw) => Profile::CoSimulation(Box::new(
                    v3::CoSimulationAdapter::new(raw, instance_name),
                )),
            },
        };

        info!("bound FMI {version} archive as {}", profile.mode());
        Ok(profile)
    }
}

enum Picked<M, C> {
    ModelExchange(M),
    CoSimulation(C),
}

fn pick<M, C>(
    model_exchange: Option<M>,
    co_simulation: Option<C>,
    force_model_exchange: bool,
    version: Version,
) -> Result<Picked<M, C>, SelectError> {
    match (model_exchange, co_simulation) {
        (Some(raw), _) if force_model_exchange => Ok(Picked::ModelExchange(raw)),
        (None, _) if force_model_exchange => Err(SelectError::Unsupported {
            version,
            mode: "model exchange",
        }),
        (_, Some(raw)) => Ok(Picked::CoSimulation(raw)),
        (Some(raw), None) => Ok(Picked::ModelExchange(raw)),
        (None, None) => Err(SelectError::Unsupported {
            version,
            mode: "any execution mode",
        }),
    }
}
