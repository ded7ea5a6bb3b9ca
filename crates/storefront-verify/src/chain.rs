//! The certificate chain carried in a token's `x5c` header

use crate::error::{ChainError, Result};
use crate::jws::CHAIN_LENGTH;
use der::Decode;
use rustls_pki_types::CertificateDer;
use storefront_types::DerCertificate;
use x509_cert::Certificate;

/// One chain entry, kept both as DER and parsed
#[derive(Debug, Clone)]
pub struct ChainCertificate {
    der: CertificateDer<'static>,
    cert: Certificate,
}

impl ChainCertificate {
    pub fn from_der(der: Vec<u8>) -> Result<Self> {
        let cert = Certificate::from_der(&der)
            .map_err(|e| ChainError::InvalidCertificate(format!("failed to parse: {}", e)))?;
        Ok(Self {
            der: CertificateDer::from(der),
            cert,
        })
    }

    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    pub fn certificate(&self) -> &Certificate {
        &self.cert
    }
}

/// Cache key for a chain: the exact leaf and intermediate encodings
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChainKey {
    leaf: Vec<u8>,
    intermediate: Vec<u8>,
}

/// Leaf, intermediate and root exactly as transmitted
///
/// The transmitted root is kept only so its position can be checked; trust
/// always comes from the configured anchors.
#[derive(Debug, Clone)]
pub struct CertificateChain {
    leaf: ChainCertificate,
    intermediate: ChainCertificate,
    root: ChainCertificate,
}

impl CertificateChain {
    /// Decode the standard-base64 `x5c` entries
    pub fn from_x5c(x5c: &[String]) -> Result<Self> {
        if x5c.len() != CHAIN_LENGTH {
            return Err(ChainError::InvalidChainLength(x5c.len()));
        }

        let ders = x5c
            .iter()
            .map(|entry| {
                DerCertificate::from_base64(entry)
                    .map(DerCertificate::into_bytes)
                    .map_err(|e| ChainError::InvalidCertificate(e.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;

        Self::from_der(ders)
    }

    /// Build a chain from DER certificates ordered leaf, intermediate, root
    pub fn from_der(ders: Vec<Vec<u8>>) -> Result<Self> {
        let [leaf, intermediate, root]: [Vec<u8>; CHAIN_LENGTH] = ders
            .try_into()
            .map_err(|ders: Vec<Vec<u8>>| ChainError::InvalidChainLength(ders.len()))?;

        Ok(Self {
            leaf: ChainCertificate::from_der(leaf)?,
            intermediate: ChainCertificate::from_der(intermediate)?,
            root: ChainCertificate::from_der(root)?,
        })
    }

    pub fn leaf(&self) -> &ChainCertificate {
        &self.leaf
    }

    pub fn intermediate(&self) -> &ChainCertificate {
        &self.intermediate
    }

    pub fn root(&self) -> &ChainCertificate {
        &self.root
    }

    /// Certificates in transmitted order
    pub fn certificates(&self) -> [&ChainCertificate; CHAIN_LENGTH] {
        [&self.leaf, &self.intermediate, &self.root]
    }

    pub fn key(&self) -> ChainKey {
        ChainKey {
            leaf: self.leaf.der.to_vec(),
            intermediate: self.intermediate.der.to_vec(),
        }
    }

    /// The leaf's subject public key (an uncompressed EC point for ES256)
    pub fn leaf_public_key(&self) -> Result<Vec<u8>> {
        self.leaf
            .cert
            .tbs_certificate
            .subject_public_key_info
            .subject_public_key
            .as_bytes()
            .map(<[u8]>::to_vec)
            .ok_or_else(|| {
                ChainError::InvalidCertificate("leaf public key has unused bits".to_string())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn self_signed(name: &str) -> Vec<u8> {
        let key = rcgen::KeyPair::generate().unwrap();
        let mut params = rcgen::CertificateParams::new(Vec::<String>::new()).unwrap();
        params
            .distinguished_name
            .push(rcgen::DnType::CommonName, name);
        params.self_signed(&key).unwrap().der().to_vec()
    }

    #[test]
    fn test_from_x5c() {
        use base64::{engine::general_purpose::STANDARD, Engine};

        let ders = [self_signed("leaf"), self_signed("int"), self_signed("root")];
        let x5c: Vec<String> = ders.iter().map(|der| STANDARD.encode(der)).collect();

        let chain = CertificateChain::from_x5c(&x5c).unwrap();
        assert_eq!(chain.leaf().der().as_ref(), ders[0].as_slice());
        assert_eq!(chain.intermediate().der().as_ref(), ders[1].as_slice());
        assert_eq!(chain.root().der().as_ref(), ders[2].as_slice());
        assert_eq!(chain.leaf_public_key().unwrap().len(), 65);
    }

    #[test]
    fn test_wrong_length() {
        let x5c = vec!["AA==".to_string(); 2];
        assert!(matches!(
            CertificateChain::from_x5c(&x5c),
            Err(ChainError::InvalidChainLength(2))
        ));
        assert!(matches!(
            CertificateChain::from_der(vec![vec![]; 4]),
            Err(ChainError::InvalidChainLength(4))
        ));
    }

    #[test]
    fn test_undecodable_entry() {
        let x5c = vec!["***".to_string(), "AA==".to_string(), "AA==".to_string()];
        assert!(matches!(
            CertificateChain::from_x5c(&x5c),
            Err(ChainError::InvalidCertificate(_))
        ));

        let x5c = vec!["AAAA".to_string(); 3];
        assert!(matches!(
            CertificateChain::from_x5c(&x5c),
            Err(ChainError::InvalidCertificate(_))
        ));
    }

    #[test]
    fn test_key_ignores_root() {
        let leaf = self_signed("leaf");
        let int = self_signed("int");
        let a = CertificateChain::from_der(vec![leaf.clone(), int.clone(), self_signed("a")])
            .unwrap();
        let b = CertificateChain::from_der(vec![leaf, int, self_signed("b")]).unwrap();
        assert_eq!(a.key(), b.key());
    }
}
