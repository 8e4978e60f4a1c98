use std::{
    io::{BufReader, Read, Write},
    path::Path,
};

use fs_err::File;
use serde::{de::DeserializeOwned, Serialize};

pub mod cascade;
pub mod cg;
pub mod coverage;
pub mod gazetteer;
pub mod lexicon;
pub mod mutation;
pub mod readings;
pub mod tag_sequence;
pub mod taxonomy;
pub mod tokenizer;

/// A resource which can be stored in and loaded from a compiled binary.
pub trait Component: Serialize + DeserializeOwned {
    fn name() -> &'static str;

    fn new<P: AsRef<Path>>(p: P) -> Result<Self, crate::Error> {
        let reader = BufReader::new(File::open(p.as_ref())?);
        Self::from_reader(reader)
    }

    fn from_reader<R: Read>(reader: R) -> Result<Self, crate::Error> {
        Ok(bincode::deserialize_from(reader)?)
    }

    fn to_writer<W: Write>(&self, writer: W) -> Result<(), crate::Error> {
        Ok(bincode::serialize_into(writer, self)?)
    }
}
