use crate::hash::double_sha256;

fn hash_pair(left: &[u8; 32], right: &[u8; 32]) -> [u8; 32] {
    let mut data = [0u8; 64];
    data[..32].copy_from_slice(left);
    data[32..].copy_from_slice(right);
    double_sha256(&data)
}

// 计算上一层，奇数个节点时最后一个与自身配对
fn next_level(nodes: &[[u8; 32]]) -> Vec<[u8; 32]> {
    nodes
        .chunks(2)
        .map(|pair| hash_pair(&pair[0], pair.get(1).unwrap_or(&pair[0])))
        .collect()
}

// 由内部字节序的交易哈希计算 Merkle 根，没有叶子时返回 None
pub fn merkle_root(leaves: &[[u8; 32]]) -> Option<[u8; 32]> {
    let mut nodes = leaves.to_vec();
    while nodes.len() > 1 {
        nodes = next_level(&nodes);
    }
    nodes.first().copied()
}

// 保存每一层节点的 Merkle 树，用于生成和验证包含证明
#[derive(Debug, Clone)]
pub struct MerkleTree {
    // levels[0] 为叶子，最后一层为根
    levels: Vec<Vec<[u8; 32]>>,
}

impl MerkleTree {
    pub fn new(leaves: &[[u8; 32]]) -> Self {
        let mut levels = vec![leaves.to_vec()];
        while let Some(last) = levels.last() {
            if last.len() <= 1 {
                break;
            }
            let level = next_level(last);
            levels.push(level);
        }
        MerkleTree { levels }
    }

    pub fn root(&self) -> Option<[u8; 32]> {
        self.levels.last().and_then(|level| level.first().copied())
    }

    pub fn leaf_count(&self) -> usize {
        self.levels[0].len()
    }

    // 生成Merkle证明：自底向上的兄弟节点
    pub fn proof(&self, index: usize) -> Option<Vec<[u8; 32]>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut proof = Vec::new();
        let mut current = index;
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = current ^ 1;
            // 没有右兄弟时与自身配对
            proof.push(*level.get(sibling).unwrap_or(&level[current]));
            current /= 2;
        }
        Some(proof)
    }

    // 验证Merkle证明
    pub fn verify_proof(leaf: &[u8; 32], proof: &[[u8; 32]], index: usize, root: &[u8; 32]) -> bool {
        let mut current_hash = *leaf;
        let mut current_index = index;

        for sibling in proof {
            current_hash = if current_index % 2 == 0 {
                hash_pair(&current_hash, sibling)
            } else {
                hash_pair(sibling, &current_hash)
            };
            current_index /= 2;
        }

        current_index == 0 && current_hash == *root
    }
}
