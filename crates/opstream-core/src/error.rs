use thiserror::Error;

use crate::types::OpCode;

/// Erros produzidos ao decodificar scripts ou ao montar a tabela de codificação
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Bytes insuficientes para ler o opcode, o prefixo de tamanho
    /// ou a largura pedida por um acessor tipado
    #[error("Fora dos limites: {needed} byte(s) no offset {offset}, {available} disponível(is)")]
    OutOfBounds {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// O tamanho declarado do operando ultrapassa o fim do script
    #[error("Operando truncado no offset {offset}: declarado {declared}, disponível {available}")]
    TruncatedOperand {
        offset: usize,
        declared: u64,
        available: usize,
    },

    /// Descritor com largura de prefixo fora de {0, 1, 2, 4}
    #[error("Metadados inválidos para {opcode}: largura de prefixo {prefix_width}")]
    InvalidMetadata {
        opcode: OpCode,
        prefix_width: u8,
    },

    /// Conjunto de descritores serializado ilegível
    #[error("Erro de decodificação de descritores: {0}")]
    DescriptorSet(String),
}

impl Error {
    /// Indica se o erro decorre do script (entrada não confiável)
    /// e não de metadados mal configurados
    pub fn is_malformed_instruction(&self) -> bool {
        matches!(self, Error::OutOfBounds { .. } | Error::TruncatedOperand { .. })
    }
}

/// Tipo de resultado usado em toda a biblioteca
pub type Result<T> = std::result::Result<T, Error>;
