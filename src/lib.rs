/*
    test inputs for the dkim vote circuits

    the circuit gets
        - the email header, sha256-padded outside of the circuit to a fixed
          number of bytes (128 / 256 / 512 depending on how the survey id is
          located in the subject), plus the number of bytes actually used
        - the rsa modulus and the pkcs1v15 signature over the unpadded header,
          both as 17 limbs of 121 bits, little limb first
        - survey id, vote choice and secret as they are

    17 * 121 = 2057 > 2048, and each limb stays well below the 254-bit bn256
    scalar field so products of two limbs do not wrap

    everything numeric goes out as a decimal string, the js witness tooling
    would lose precision otherwise
*/

pub mod config;
pub mod error;
pub mod generate;
pub mod witness_gen;

pub use config::GenerationConfig;
pub use error::{Error, Result};
pub use generate::{generate, generate_to_file, Generated, Metadata};
pub use witness_gen::header::EmailFormat;
pub use witness_gen::limbs::LimbParams;
pub use witness_gen::vector::TestVector;
