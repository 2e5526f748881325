//! Solidity bindings for the university voting contract

use alloy::{primitives::B256, sol, sol_types::SolEvent};
use ballot_indexer::ActivityKind;

sol! {
    #[sol(rpc)]
    contract VotacionUniversitaria {
        event VotacionCreada(
            uint256 indexed idVotacion,
            address indexed creador,
            string titulo,
            uint256 fechaFin,
            uint256 cantidadOpciones
        );
        event VotoEmitido(uint256 indexed idVotacion, address indexed votante, uint256 idOpcion);

        function owner() external view returns (address);
        function contadorVotaciones() external view returns (uint256);
        function bloqueDespliegue() external view returns (uint256);
        function obtenerVotacion(uint256 idVotacion)
            external
            view
            returns (string titulo, address creador, uint256 fechaFin, uint256 cantidadOpciones, bool activa);
        function obtenerOpciones(uint256 idVotacion) external view returns (string[]);
        function yaVoto(uint256 idVotacion, address votante) external view returns (bool);
        function obtenerVotos(uint256 idVotacion, uint256 idOpcion) external view returns (uint256);

        function crearVotacion(string titulo, string[] opciones, uint256 duracion) external;
        function votar(uint256 idVotacion, uint256 idOpcion) external;
    }
}

/// Topic0 of the log emitted for `kind`.
pub fn topic_for(kind: ActivityKind) -> B256 {
    match kind {
        ActivityKind::Created => VotacionUniversitaria::VotacionCreada::SIGNATURE_HASH,
        ActivityKind::VoteCast => VotacionUniversitaria::VotoEmitido::SIGNATURE_HASH,
    }
}
